//! Capability interface shared by both games
//!
//! A session holds one `Box<dyn Engine>` and drives it once per frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::snake::{Direction, SnakeGame};
use super::tetris::TetrisGame;
use crate::error::ArcadeError;

/// Which game is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Snake,
    Tetris,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Tetris => "tetris",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" => Ok(GameKind::Snake),
            "tetris" => Ok(GameKind::Tetris),
            other => Err(ArcadeError::UnknownGame(other.to_string())),
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting updates and input
    Playing,
    /// Terminal until reset
    GameOver,
}

/// Discrete player intents delivered between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Snake: queue a turn for the next step
    Turn(Direction),
    /// Tetris controls
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// Read-only access for renderers
#[derive(Debug, Clone, Copy)]
pub enum GameView<'a> {
    Snake(&'a SnakeGame),
    Tetris(&'a TetrisGame),
}

pub trait Engine {
    fn kind(&self) -> GameKind;

    /// Advance by `dt_ms` of simulation time
    fn update(&mut self, dt_ms: f64);

    /// Apply a player intent. Intents the game does not understand are ignored.
    fn apply(&mut self, action: Action);

    fn is_game_over(&self) -> bool;

    /// Start a fresh run with the same configuration
    fn reset(&mut self);

    fn score(&self) -> u64;

    /// Take every event queued since the last drain
    fn drain_events(&mut self) -> Vec<GameEvent>;

    fn view(&self) -> GameView<'_>;
}
