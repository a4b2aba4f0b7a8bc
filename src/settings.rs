//! Player preferences
//!
//! Stored as one JSON object under the settings key. Engines read the
//! difficulty once at construction.

use serde::{Deserialize, Serialize};

use crate::tuning::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Master switch for every sound cue
    pub sound_enabled: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            sound_enabled: true,
            music_volume: 0.3,
            sfx_volume: 0.5,
        }
    }
}

impl Settings {
    /// Effective effects volume (0 when sound is off)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_enabled {
            self.sfx_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn effective_music_volume(&self) -> f32 {
        if self.sound_enabled {
            self.music_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.difficulty, Difficulty::Normal);
        assert!(settings.sound_enabled);
        assert_eq!(settings.effective_sfx_volume(), 0.5);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["difficulty"], "normal");
        assert_eq!(json["soundEnabled"], true);
        assert!(json.get("sfxVolume").is_some());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"difficulty":"hard"}"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.music_volume, 0.3);
    }

    #[test]
    fn test_muted_volumes() {
        let settings = Settings {
            sound_enabled: false,
            sfx_volume: 2.0,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
        let loud = Settings {
            sfx_volume: 2.0,
            ..Settings::default()
        };
        assert_eq!(loud.effective_sfx_volume(), 1.0);
    }
}
