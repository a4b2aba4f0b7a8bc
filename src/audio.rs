//! Sound cues
//!
//! The session hands every `Sound` event to an `AudioSink`. In the browser
//! that is `WebAudio`, which synthesizes short beeps with the Web Audio API.
//! Native builds and tests use `Muted` or `Recorder`.

use crate::achievements::Achievement;
use crate::sim::Sound;

/// Fire-and-forget audio and notification collaborator
pub trait AudioSink {
    fn play(&mut self, sound: Sound);

    /// Surface an unlock to the player
    fn achievement_unlocked(&mut self, achievement: &Achievement) {
        log::info!(
            "Achievement unlocked: {} - {}",
            achievement.name,
            achievement.description
        );
    }

    /// Volume changes from the settings screen
    fn set_volume(&mut self, _sfx_volume: f32) {}
}

/// Beep parameters for a cue: (frequency Hz, duration s)
pub fn beep(sound: Sound) -> (f32, f64) {
    match sound {
        Sound::Food => (440.0, 0.1),
        Sound::Collision => (200.0, 0.3),
        Sound::LineClear => (550.0, 0.2),
        Sound::PowerUp => (660.0, 0.15),
        Sound::Achievement => (880.0, 0.2),
        Sound::Move => (330.0, 0.05),
        Sound::Rotate => (370.0, 0.05),
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, _sound: Sound) {}
}

/// Keeps every cue and notification in order
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub sounds: Vec<Sound>,
    pub notifications: Vec<&'static str>,
}

impl AudioSink for Recorder {
    fn play(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    fn achievement_unlocked(&mut self, achievement: &Achievement) {
        self.notifications.push(achievement.id);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, beep};
    use crate::sim::Sound;

    /// Peak gain relative to the effects volume
    const BEEP_GAIN: f32 = 0.3;

    pub struct WebAudio {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
    }

    impl WebAudio {
        pub fn new(sfx_volume: f32) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: sfx_volume.clamp(0.0, 1.0),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, sound: Sound) {
            if self.sfx_volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let (freq, duration) = beep(sound);
            let Some((osc, gain)) = self.create_osc(ctx, freq) else {
                log::warn!("Failed to play sound: {}", sound.as_str());
                return;
            };
            let t = ctx.current_time();

            gain.gain()
                .set_value_at_time(self.sfx_volume * BEEP_GAIN, t)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        fn set_volume(&mut self, sfx_volume: f32) {
            self.sfx_volume = sfx_volume.clamp(0.0, 1.0);
        }
    }
}
