//! Data-driven game balance
//!
//! Defaults come from [`crate::consts`]. A JSON document can override any
//! subset of fields; missing keys keep their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance knobs read by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lives: u8,
    pub respawn_delay_ticks: u32,
    pub invincibility_ticks: u32,
    pub spawn_interval_ticks: u32,
    pub boss_spawn_interval_ticks: u32,
    pub boss_threshold: u32,
    pub boss_warning_ticks: u32,
    pub boss_hp: u32,
    pub split_radius_threshold: f32,
    pub split_child_ratio: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lives: PLAYER_LIVES,
            respawn_delay_ticks: RESPAWN_DELAY_TICKS,
            invincibility_ticks: INVINCIBILITY_TICKS,
            spawn_interval_ticks: SPAWN_INTERVAL_TICKS,
            boss_spawn_interval_ticks: BOSS_SPAWN_INTERVAL_TICKS,
            boss_threshold: BOSS_THRESHOLD,
            boss_warning_ticks: BOSS_WARNING_TICKS,
            boss_hp: BOSS_HP,
            split_radius_threshold: SPLIT_RADIUS_THRESHOLD,
            split_child_ratio: SPLIT_CHILD_RATIO,
        }
    }
}

/// Rejected tuning document
#[derive(Debug)]
pub enum TuningError {
    /// The document is not valid JSON for [`Tuning`]
    Parse(serde_json::Error),
    /// A value is outside its playable range
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "invalid tuning document: {e}"),
            TuningError::OutOfRange { field, expected } => {
                write!(f, "tuning field '{field}' out of range (expected {expected})")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::OutOfRange { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

impl Tuning {
    /// Parse and validate a JSON override document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every field is playable
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.lives == 0 {
            return Err(TuningError::OutOfRange {
                field: "lives",
                expected: ">= 1",
            });
        }
        if self.boss_hp == 0 {
            return Err(TuningError::OutOfRange {
                field: "boss_hp",
                expected: ">= 1",
            });
        }
        if self.spawn_interval_ticks == 0 || self.boss_spawn_interval_ticks == 0 {
            return Err(TuningError::OutOfRange {
                field: "spawn_interval_ticks",
                expected: ">= 1",
            });
        }
        if !(self.split_child_ratio > 0.0 && self.split_child_ratio < 1.0) {
            return Err(TuningError::OutOfRange {
                field: "split_child_ratio",
                expected: "between 0 and 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let t = Tuning::default();
        assert_eq!(t.boss_hp, 50);
        assert_eq!(t.boss_threshold, 10);
        assert_eq!(t.lives, 3);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "boss_hp": 25 }"#).unwrap();
        assert_eq!(t.boss_hp, 25);
        assert_eq!(t.boss_threshold, BOSS_THRESHOLD);
    }

    #[test]
    fn test_rejects_zero_lives() {
        let err = Tuning::from_json(r#"{ "lives": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { field: "lives", .. }));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
    }
}
