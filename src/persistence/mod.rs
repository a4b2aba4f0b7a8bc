//! Key/value persistence
//!
//! Everything lives under the `classicGames_` prefix:
//! - `highScore_<game>`: integer
//! - `achievements_<game>`: JSON array of unlocked ids
//! - `stats_<game>`: JSON stats object
//! - `settings`: JSON settings object
//!
//! Calls never fail from the caller's point of view. Unreadable values fall
//! back to defaults and failed writes are logged.

pub mod memory;

pub use memory::MemoryBackend;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::GameKind;

pub const KEY_PREFIX: &str = "classicGames_";

/// Raw string storage (LocalStorage on web, a map in tests)
pub trait Backend {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Returns false if the write was refused
    fn set_item(&mut self, key: &str, value: &str) -> bool;

    fn remove_item(&mut self, key: &str);

    /// Every key currently stored
    fn keys(&self) -> Vec<String>;
}

/// Lifetime statistics per game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub games_played: u64,
    pub total_score: u64,
    pub best_game: u64,
    /// Seconds
    pub total_time: u64,
}

/// Typed access on top of a backend
#[derive(Debug)]
pub struct Store<B: Backend> {
    backend: B,
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn key(name: &str) -> String {
        format!("{KEY_PREFIX}{name}")
    }

    fn game_key(name: &str, kind: GameKind) -> String {
        format!("{KEY_PREFIX}{name}_{kind}")
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if !self.backend.set_item(key, &json) {
                    log::warn!("Failed to write {}", key);
                }
            }
            Err(e) => log::warn!("Failed to encode {}: {}", key, e),
        }
    }

    /// Best score so far, 0 if none
    pub fn high_score(&self, kind: GameKind) -> u64 {
        let key = Self::game_key("highScore", kind);
        self.backend
            .get_item(&key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Store `score` if it beats the current best. Returns true when it did.
    pub fn set_high_score(&mut self, kind: GameKind, score: u64) -> bool {
        if score <= self.high_score(kind) {
            return false;
        }
        let key = Self::game_key("highScore", kind);
        if !self.backend.set_item(&key, &score.to_string()) {
            log::warn!("Failed to write {}", key);
        }
        true
    }

    /// Unlocked achievement ids in unlock order
    pub fn unlocked_achievements(&self, kind: GameKind) -> Vec<String> {
        self.read_json(&Self::game_key("achievements", kind))
            .unwrap_or_default()
    }

    /// Append `id` to the unlocked set. Returns false if it was already there.
    pub fn add_achievement(&mut self, kind: GameKind, id: &str) -> bool {
        let mut unlocked = self.unlocked_achievements(kind);
        if unlocked.iter().any(|existing| existing == id) {
            return false;
        }
        unlocked.push(id.to_string());
        self.write_json(&Self::game_key("achievements", kind), &unlocked);
        true
    }

    pub fn settings(&self) -> Settings {
        self.read_json(&Self::key("settings")).unwrap_or_default()
    }

    pub fn set_settings(&mut self, settings: &Settings) {
        self.write_json(&Self::key("settings"), settings);
    }

    pub fn stats(&self, kind: GameKind) -> GameStats {
        self.read_json(&Self::game_key("stats", kind))
            .unwrap_or_default()
    }

    /// Fold one finished run into the lifetime stats
    pub fn record_game(&mut self, kind: GameKind, score: u64, seconds: u64) -> GameStats {
        let mut stats = self.stats(kind);
        stats.games_played += 1;
        stats.total_score += score;
        stats.best_game = stats.best_game.max(score);
        stats.total_time += seconds;
        self.write_json(&Self::game_key("stats", kind), &stats);
        stats
    }

    /// Forget high score, achievements and stats of one game
    pub fn clear_game(&mut self, kind: GameKind) {
        for name in ["highScore", "achievements", "stats"] {
            self.backend.remove_item(&Self::game_key(name, kind));
        }
    }

    /// Remove every key this store owns
    pub fn clear_all(&mut self) {
        let owned: Vec<String> = self
            .backend
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(KEY_PREFIX))
            .collect();
        for key in owned {
            self.backend.remove_item(&key);
        }
        log::info!("Cleared all saved data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Difficulty;

    fn store() -> Store<MemoryBackend> {
        Store::new(MemoryBackend::default())
    }

    #[test]
    fn test_high_score_only_increases() {
        let mut store = store();
        assert_eq!(store.high_score(GameKind::Snake), 0);
        assert!(store.set_high_score(GameKind::Snake, 120));
        assert!(!store.set_high_score(GameKind::Snake, 120));
        assert!(!store.set_high_score(GameKind::Snake, 50));
        assert_eq!(store.high_score(GameKind::Snake), 120);
        assert_eq!(store.high_score(GameKind::Tetris), 0);
        assert_eq!(
            store.backend().get_item("classicGames_highScore_snake").as_deref(),
            Some("120")
        );
    }

    #[test]
    fn test_zero_is_never_a_high_score() {
        let mut store = store();
        assert!(!store.set_high_score(GameKind::Tetris, 0));
    }

    #[test]
    fn test_add_achievement_idempotent() {
        let mut store = store();
        assert!(store.add_achievement(GameKind::Tetris, "first_line"));
        assert!(!store.add_achievement(GameKind::Tetris, "first_line"));
        assert!(store.add_achievement(GameKind::Tetris, "lines_10"));
        assert_eq!(
            store.unlocked_achievements(GameKind::Tetris),
            vec!["first_line".to_string(), "lines_10".to_string()]
        );
        assert!(store.unlocked_achievements(GameKind::Snake).is_empty());
    }

    #[test]
    fn test_settings_round_trip_and_fallback() {
        let mut store = store();
        assert_eq!(store.settings(), Settings::default());

        let settings = Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        };
        store.set_settings(&settings);
        assert_eq!(store.settings(), settings);

        let mut corrupt = MemoryBackend::default();
        corrupt.set_item("classicGames_settings", "{not json");
        assert_eq!(Store::new(corrupt).settings(), Settings::default());
    }

    #[test]
    fn test_record_game() {
        let mut store = store();
        store.record_game(GameKind::Snake, 40, 12);
        let stats = store.record_game(GameKind::Snake, 30, 8);
        assert_eq!(
            stats,
            GameStats {
                games_played: 2,
                total_score: 70,
                best_game: 40,
                total_time: 20,
            }
        );
        let raw = store.backend().get_item("classicGames_stats_snake").unwrap();
        assert!(raw.contains("\"gamesPlayed\":2"));
    }

    #[test]
    fn test_clear_game_and_all() {
        let mut store = store();
        store.set_high_score(GameKind::Snake, 10);
        store.set_high_score(GameKind::Tetris, 10);
        store.add_achievement(GameKind::Snake, "first_food");
        store.set_settings(&Settings::default());

        store.clear_game(GameKind::Snake);
        assert_eq!(store.high_score(GameKind::Snake), 0);
        assert!(store.unlocked_achievements(GameKind::Snake).is_empty());
        assert_eq!(store.high_score(GameKind::Tetris), 10);

        let mut backend = MemoryBackend::default();
        backend.set_item("unrelated", "keep");
        let mut store = Store::new(backend);
        store.set_high_score(GameKind::Tetris, 10);
        store.clear_all();
        assert_eq!(store.high_score(GameKind::Tetris), 0);
        assert_eq!(store.backend().get_item("unrelated").as_deref(), Some("keep"));
    }
}
