//! Main menu: settings controls and the best-score panel
//!
//! The browser front end turns clicks into `MenuAction`s and paints a
//! `MenuSummary`. Everything here works against any storage backend.

use crate::persistence::{Backend, Store};
use crate::settings::Settings;
use crate::sim::GameKind;
use crate::tuning::Difficulty;

/// Asked before wiping saved data
pub const RESET_CONFIRM: &str = "Are you sure you want to reset all data? This cannot be undone!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    SetDifficulty(Difficulty),
    ToggleSound,
    /// Effects volume, 0.0 - 1.0
    SetSfxVolume(f32),
    /// Drop scores, achievements, stats and settings of every game
    ResetAll,
}

impl MenuAction {
    /// From a `data-difficulty` attribute
    pub fn difficulty(value: &str) -> Option<Self> {
        Difficulty::from_str(value).map(MenuAction::SetDifficulty)
    }

    /// From a 0-100 slider value
    pub fn sfx_percent(value: &str) -> Option<Self> {
        let percent: f32 = value.trim().parse().ok()?;
        Some(MenuAction::SetSfxVolume(percent / 100.0))
    }
}

/// `settings` with `action` applied. A reset yields the defaults.
pub fn updated(mut settings: Settings, action: MenuAction) -> Settings {
    match action {
        MenuAction::SetDifficulty(difficulty) => settings.difficulty = difficulty,
        MenuAction::ToggleSound => settings.sound_enabled = !settings.sound_enabled,
        MenuAction::SetSfxVolume(volume) => settings.sfx_volume = volume.clamp(0.0, 1.0),
        MenuAction::ResetAll => settings = Settings::default(),
    }
    settings
}

/// Write `action` through to the store and return the settings now in effect
pub fn apply<B: Backend>(store: &mut Store<B>, action: MenuAction) -> Settings {
    if action == MenuAction::ResetAll {
        store.clear_all();
        return store.settings();
    }
    let settings = updated(store.settings(), action);
    store.set_settings(&settings);
    log::info!(
        "Settings: {} difficulty, sound {}, effects {:.2}",
        settings.difficulty.as_str(),
        if settings.sound_enabled { "on" } else { "off" },
        settings.sfx_volume
    );
    settings
}

/// Text of the sound toggle button
pub fn sound_label(enabled: bool) -> &'static str {
    if enabled { "🔊" } else { "🔇" }
}

/// Element id of a game's best-score label
pub fn high_score_id(kind: GameKind) -> String {
    format!("{kind}-high-score")
}

/// What the menu shows
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSummary {
    pub settings: Settings,
    pub snake_high_score: u64,
    pub tetris_high_score: u64,
}

impl MenuSummary {
    pub fn load<B: Backend>(store: &Store<B>) -> Self {
        Self {
            settings: store.settings(),
            snake_high_score: store.high_score(GameKind::Snake),
            tetris_high_score: store.high_score(GameKind::Tetris),
        }
    }

    pub fn high_score(&self, kind: GameKind) -> u64 {
        match kind {
            GameKind::Snake => self.snake_high_score,
            GameKind::Tetris => self.tetris_high_score,
        }
    }
}
