//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Keyboard input (key name to session command)
//! - Storage (LocalStorage on web)
//! - Canvas 2D rendering

#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(target_arch = "wasm32")]
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageBackend;

use crate::session::Command;
use crate::sim::{Action, Direction, GameKind};

/// Map a `KeyboardEvent.key` value to a command.
///
/// Space pauses while a run is live. R and Escape only act on the game-over
/// screen. Game controls are arrows or WASD in either case.
pub fn command_for_key(kind: GameKind, key: &str, game_over: bool) -> Option<Command> {
    match key {
        " " | "Spacebar" => return (!game_over).then_some(Command::TogglePause),
        "r" | "R" => return game_over.then_some(Command::Restart),
        "Escape" => return game_over.then_some(Command::Menu),
        _ => {}
    }
    if game_over {
        return None;
    }

    let action = match kind {
        GameKind::Snake => Action::Turn(match key {
            "ArrowUp" | "w" | "W" => Direction::Up,
            "ArrowDown" | "s" | "S" => Direction::Down,
            "ArrowLeft" | "a" | "A" => Direction::Left,
            "ArrowRight" | "d" | "D" => Direction::Right,
            _ => return None,
        }),
        GameKind::Tetris => match key {
            "ArrowLeft" | "a" | "A" => Action::MoveLeft,
            "ArrowRight" | "d" | "D" => Action::MoveRight,
            "ArrowDown" | "s" | "S" => Action::SoftDrop,
            "ArrowUp" | "w" | "W" => Action::Rotate,
            _ => return None,
        },
    };
    Some(Command::Act(action))
}
