//! Best-time leaderboard
//!
//! The hosting page submits a completion time after a boss kill; the game
//! core never calls into this module. Persisted to LocalStorage, keeps the
//! ten fastest players with one entry each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::Analytics;

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;
/// Longest player name kept, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Shown until anyone has submitted a time
const FALLBACK_ENTRIES: [(&str, u64); 5] = [
    ("ACE", 45_000),
    ("FOX", 52_000),
    ("SKY", 58_000),
    ("JAX", 63_000),
    ("NEO", 71_000),
];

/// A stored run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    /// Boss kill time in milliseconds
    pub time_ms: u64,
    /// Unix timestamp (ms) of the submission
    pub created_at: f64,
    #[serde(default)]
    pub analytics: Option<Analytics>,
}

/// An entry with its 1-based position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub player_name: String,
    pub time_ms: u64,
    pub rank: usize,
}

/// Rejected submission
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    /// Name is blank after trimming
    EmptyName,
    /// Time is zero, negative or not a number
    InvalidTime(f64),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::EmptyName => write!(f, "player name is empty"),
            LeaderboardError::InvalidTime(t) => write!(f, "invalid completion time: {t}"),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// Fastest boss kills
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    /// Sorted ascending by time, one entry per player
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hero_rocket_leaderboard";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Board pre-filled with the house times
    pub fn with_fallback() -> Self {
        Self {
            entries: FALLBACK_ENTRIES
                .iter()
                .map(|(name, time_ms)| LeaderboardEntry {
                    player_name: (*name).to_string(),
                    time_ms: *time_ms,
                    created_at: 0.0,
                    analytics: None,
                })
                .collect(),
        }
    }

    /// Record a run, keeping only the player's best time
    pub fn submit_score(
        &mut self,
        player_name: &str,
        time_ms: f64,
        analytics: Option<Analytics>,
        now: f64,
    ) -> Result<LeaderboardEntry, LeaderboardError> {
        let player_name = normalize_name(player_name).ok_or(LeaderboardError::EmptyName)?;
        if !time_ms.is_finite() || time_ms.round() < 1.0 {
            return Err(LeaderboardError::InvalidTime(time_ms));
        }

        let entry = LeaderboardEntry {
            player_name,
            time_ms: time_ms.round() as u64,
            created_at: now,
            analytics,
        };

        match self
            .entries
            .iter_mut()
            .find(|e| e.player_name == entry.player_name)
        {
            Some(existing) if entry.time_ms < existing.time_ms => *existing = entry.clone(),
            Some(_) => {}
            None => self.entries.push(entry.clone()),
        }

        self.entries.sort_by_key(|e| e.time_ms);
        self.entries.truncate(MAX_ENTRIES);
        log::info!(
            "Leaderboard submit: {} in {}",
            entry.player_name,
            format_time(entry.time_ms)
        );
        Ok(entry)
    }

    /// Fastest `limit` entries with ranks
    pub fn top(&self, limit: usize) -> Vec<RankedEntry> {
        self.entries
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, e)| RankedEntry {
                player_name: e.player_name.clone(),
                time_ms: e.time_ms,
                rank: i + 1,
            })
            .collect()
    }

    /// Position a time would take: one past every strictly faster entry
    pub fn player_rank(&self, time_ms: u64) -> usize {
        1 + self.entries.iter().filter(|e| e.time_ms < time_ms).count()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from LocalStorage, falling back to the house times (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Leaderboard>(&json) {
                    Ok(board) if !board.is_empty() => {
                        log::info!("Loaded {} leaderboard entries", board.entries.len());
                        return board;
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Discarding unreadable leaderboard: {e}"),
                }
            }
        }

        log::info!("No leaderboard found, using fallback entries");
        Self::with_fallback()
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Leaderboard saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::with_fallback()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Trim, upper-case and cap a player name; None when nothing is left
fn normalize_name(name: &str) -> Option<String> {
    let name: String = name.trim().to_uppercase().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    (!name.is_empty()).then_some(name)
}

/// `m:ss.mmm`, or `s.mmm` under a minute
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{seconds}.{millis:03}")
    }
}

/// `m:ss.d` for the in-game clock
pub fn format_hud_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let tenths = (ms % 1000) / 100;
    format!("{minutes}:{seconds:02}.{tenths}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_normalizes_name() {
        let mut board = Leaderboard::new();
        let entry = board
            .submit_score("  maverick the quick brown fox  ", 41_234.6, None, 1.0)
            .unwrap();
        assert_eq!(entry.player_name, "MAVERICK THE QUICK B");
        assert_eq!(entry.time_ms, 41_235);
    }

    #[test]
    fn test_submit_rejects_bad_input() {
        let mut board = Leaderboard::new();
        assert_eq!(
            board.submit_score("   ", 1000.0, None, 0.0),
            Err(LeaderboardError::EmptyName)
        );
        assert!(matches!(
            board.submit_score("ACE", 0.0, None, 0.0),
            Err(LeaderboardError::InvalidTime(_))
        ));
        assert!(matches!(
            board.submit_score("ACE", f64::NAN, None, 0.0),
            Err(LeaderboardError::InvalidTime(_))
        ));
        assert!(board.is_empty());
    }

    #[test]
    fn test_keeps_best_time_per_player() {
        let mut board = Leaderboard::with_fallback();
        board.submit_score("fox", 60_000.0, None, 0.0).unwrap();
        assert_eq!(board.entries.len(), 5);
        assert_eq!(
            board.entries.iter().find(|e| e.player_name == "FOX").map(|e| e.time_ms),
            Some(52_000)
        );

        board.submit_score("fox", 40_000.0, None, 0.0).unwrap();
        assert_eq!(board.entries.len(), 5);
        assert_eq!(board.entries[0].player_name, "FOX");
        assert_eq!(board.entries[0].time_ms, 40_000);
    }

    #[test]
    fn test_keeps_top_ten_sorted() {
        let mut board = Leaderboard::new();
        for i in 0..15u32 {
            board
                .submit_score(&format!("P{i}"), 90_000.0 - i as f64 * 1000.0, None, 0.0)
                .unwrap();
        }
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert!(board.entries.windows(2).all(|w| w[0].time_ms <= w[1].time_ms));
        assert_eq!(board.entries[0].player_name, "P14");
    }

    #[test]
    fn test_ranks() {
        let board = Leaderboard::with_fallback();
        let top = board.top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[2].player_name, "SKY");

        assert_eq!(board.player_rank(10_000), 1);
        assert_eq!(board.player_rank(52_000), 2);
        assert_eq!(board.player_rank(60_000), 4);
        assert_eq!(board.player_rank(999_999), 6);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(45_000), "45.000");
        assert_eq!(format_time(83_456), "1:23.456");
        assert_eq!(format_time(7), "0.007");
        assert_eq!(format_hud_time(83_456), "1:23.4");
        assert_eq!(format_hud_time(0), "0:00.0");
    }

    #[test]
    fn test_entries_round_trip_with_analytics() {
        let mut board = Leaderboard::new();
        let analytics = Analytics {
            shots_fired: 80,
            hits: 60,
            asteroids_destroyed: 12,
            boss_hits: 50,
            damage_taken: 1,
        };
        board.submit_score("ace", 39_000.0, Some(analytics), 5.0).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let back: Leaderboard = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries[0].analytics, Some(analytics));
    }
}
