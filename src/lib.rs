//! Arcade Duo - Snake and a falling-block puzzle on one scaffold
//!
//! Core modules:
//! - `sim`: Deterministic simulation (snake and tetris engines, deferred timers)
//! - `session`: Frame-driven wrapper around one engine (pause, restart, game over)
//! - `achievements`: Static unlock tables and the evaluator
//! - `menu`: Settings controls and best scores shown between games
//! - `persistence`: High scores, settings, unlocked achievements, stats
//! - `platform`: Browser glue (storage backend, canvas, keyboard)
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod audio;
pub mod error;
pub mod menu;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use achievements::{Achievement, AchievementTracker};
pub use error::ArcadeError;
pub use session::Session;
pub use settings::Settings;
pub use tuning::Difficulty;

/// Presentation constants shared by the renderers
pub mod consts {
    /// Snake cell edge in canvas pixels
    pub const SNAKE_CELL_PX: u32 = 20;
    /// Tetris block edge in canvas pixels
    pub const TETRIS_BLOCK_PX: u32 = 30;

    /// Background fill
    pub const COLOR_BACKGROUND: &str = "#1a1a1a";
    /// Grid lines
    pub const COLOR_GRID: &str = "#2a2a2a";
    pub const COLOR_SNAKE: &str = "#50e3c2";
    pub const COLOR_SNAKE_HEAD: &str = "#4a90e2";
    pub const COLOR_FOOD: &str = "#f5a623";
    pub const COLOR_POWER_UP: &str = "#ff4081";

    /// Piece colors, indexed by `cell value - 1`
    pub const PIECE_COLORS: [&str; 7] = [
        "#4a90e2", // I
        "#50e3c2", // J
        "#f5a623", // L
        "#ff4081", // O
        "#9013fe", // S
        "#bd10e0", // T
        "#7ed321", // Z
    ];
}
