//! Audio cues
//!
//! The simulation only names a cue; an [`AudioSink`] decides what, if
//! anything, comes out of the speakers. On the web the cues are synthesized
//! with the Web Audio API, so there are no sound files to load.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Rocket fires a laser
    Laser,
    /// Something blew up; `intensity` scales loudness and length (1.0 = medium rock)
    Explosion { intensity: f32 },
    /// Laser struck the boss
    BossHit,
}

/// Something that can play sound cues
///
/// Playback is fire-and-forget: implementations must never block and must
/// swallow their own failures.
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

impl<T: AudioSink + ?Sized> AudioSink for std::rc::Rc<T> {
    fn play(&self, effect: SoundEffect) {
        (**self).play(effect);
    }
}

/// Discards every cue (headless runs and tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, _effect: SoundEffect) {}
}

/// Loudness multiplier from the player's volume preferences
pub fn effective_volume(master: f32, sfx: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        (master * sfx).clamp(0.0, 1.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;

    use super::{AudioSink, SoundEffect, effective_volume};
    use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

    /// Procedural Web Audio backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        master_volume: Cell<f32>,
        sfx_volume: Cell<f32>,
        muted: Cell<bool>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // Fails outside a secure context; the game runs silent
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: Cell::new(0.8),
                sfx_volume: Cell::new(1.0),
                muted: Cell::new(false),
            }
        }

        pub fn set_master_volume(&self, vol: f32) {
            self.master_volume.set(vol.clamp(0.0, 1.0));
        }

        pub fn set_sfx_volume(&self, vol: f32) {
            self.sfx_volume.set(vol.clamp(0.0, 1.0));
        }

        pub fn set_muted(&self, muted: bool) {
            self.muted.set(muted);
        }

        /// Resume after a user gesture
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short falling sine chirp
        fn play_laser(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(880.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(220.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Bright triangle ping
        fn play_boss_hit(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();
            osc.frequency().set_value_at_time(1200.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(400.0, t + 0.06)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }

        /// Filtered white noise burst
        fn play_explosion(&self, ctx: &AudioContext, vol: f32, intensity: f32) {
            let intensity = intensity.clamp(0.3, 3.0);
            let duration = 0.25 + 0.1 * intensity as f64;
            let rate = ctx.sample_rate();
            let frames = (rate as f64 * duration) as u32;

            let Ok(buffer) = ctx.create_buffer(1, frames, rate) else {
                return;
            };
            let mut noise: Vec<f32> = (0..frames)
                .map(|i| {
                    let fade = 1.0 - i as f32 / frames as f32;
                    (js_sys::Math::random() as f32 * 2.0 - 1.0) * fade
                })
                .collect();
            if buffer.copy_to_channel(&mut noise, 0).is_err() {
                return;
            }

            let Ok(src) = ctx.create_buffer_source() else {
                return;
            };
            let Ok(filter) = ctx.create_biquad_filter() else {
                return;
            };
            let Ok(gain) = ctx.create_gain() else {
                return;
            };
            src.set_buffer(Some(&buffer));
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(600.0 + 300.0 * intensity);

            if src.connect_with_audio_node(&filter).is_err()
                || filter.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&ctx.destination()).is_err()
            {
                return;
            }

            let t = ctx.current_time();
            gain.gain()
                .set_value_at_time(vol * (0.25 + 0.1 * intensity).min(0.6), t)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();
            src.start().ok();
            src.stop_with_when(t + duration).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&self, effect: SoundEffect) {
            let vol = effective_volume(
                self.master_volume.get(),
                self.sfx_volume.get(),
                self.muted.get(),
            );
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Laser => self.play_laser(ctx, vol),
                SoundEffect::Explosion { intensity } => self.play_explosion(ctx, vol, intensity),
                SoundEffect::BossHit => self.play_boss_hit(ctx, vol),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_volume() {
        assert_eq!(effective_volume(0.8, 0.5, false), 0.4);
        assert_eq!(effective_volume(1.0, 1.0, true), 0.0);
        assert_eq!(effective_volume(2.0, 1.0, false), 1.0);
    }

    #[test]
    fn test_silent_sink_accepts_everything() {
        let sink: &dyn AudioSink = &SilentAudio;
        sink.play(SoundEffect::Laser);
        sink.play(SoundEffect::Explosion { intensity: 3.0 });
        sink.play(SoundEffect::BossHit);
    }
}
