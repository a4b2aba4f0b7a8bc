//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `update(dt_ms)`
//! - Seeded RNG only
//! - Deferred work runs on the engine's own timer queue
//! - No rendering, audio or storage dependencies; outcomes leave as events

pub mod engine;
pub mod events;
pub mod snake;
pub mod tetris;
pub mod timers;

pub use engine::{Action, Engine, GameKind, GamePhase, GameView};
pub use events::{GameEvent, Sound, Stat};
pub use snake::{Direction, PowerUp, PowerUpKind, Segment, SnakeGame};
pub use tetris::{ActivePiece, Board, PieceKind, Shape, TetrisGame};
pub use timers::Timers;

use crate::error::ArcadeError;
use crate::tuning::{Difficulty, SnakeConfig, TetrisConfig};

/// Build the engine for `kind` with difficulty-derived configuration
pub fn build_engine(
    kind: GameKind,
    difficulty: Difficulty,
    seed: u64,
) -> Result<Box<dyn Engine>, ArcadeError> {
    let engine: Box<dyn Engine> = match kind {
        GameKind::Snake => Box::new(SnakeGame::new(SnakeConfig::for_difficulty(difficulty), seed)?),
        GameKind::Tetris => Box::new(TetrisGame::new(
            TetrisConfig::for_difficulty(difficulty),
            seed,
        )?),
    };
    Ok(engine)
}
