//! Events emitted by the engines
//!
//! Engines never talk to audio, storage or the achievement evaluator
//! directly. They queue events that the session drains after each update.

use serde::{Deserialize, Serialize};

/// Fire-and-forget sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// Snake ate food
    Food,
    /// Game over
    Collision,
    /// One or more rows cleared
    LineClear,
    /// Snake collected a power-up
    PowerUp,
    /// Achievement unlocked
    Achievement,
    /// Piece shifted sideways
    Move,
    /// Piece rotated
    Rotate,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Food => "food",
            Sound::Collision => "collision",
            Sound::LineClear => "lineClear",
            Sound::PowerUp => "powerUp",
            Sound::Achievement => "achievement",
            Sound::Move => "move",
            Sound::Rotate => "rotate",
        }
    }
}

/// Statistics the achievement evaluator watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    /// Count of the game's first milestone (food eaten / lines cleared)
    First,
    Score,
    Length,
    #[serde(rename = "powerup")]
    PowerUp,
    Lines,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(Sound),
    /// A watched statistic changed
    Stat { stat: Stat, value: u64 },
    /// Terminal transition; emitted exactly once per run
    GameOver { score: u64 },
}
