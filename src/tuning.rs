//! Data-driven game balance
//!
//! Difficulty-dependent values come from a static table and are read once
//! when an engine is built. Everything else is a fixed mechanic.

use serde::{Deserialize, Serialize};

use crate::error::ArcadeError;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Snake values for this difficulty
    pub fn snake(&self) -> SnakeTuning {
        match self {
            Difficulty::Easy => SnakeTuning { step_interval_ms: 200 },
            Difficulty::Normal => SnakeTuning { step_interval_ms: 150 },
            Difficulty::Hard => SnakeTuning { step_interval_ms: 100 },
        }
    }

    /// Tetris values for this difficulty
    pub fn tetris(&self) -> TetrisTuning {
        match self {
            Difficulty::Easy => TetrisTuning {
                drop_interval_ms: 1200,
                line_score: 100,
            },
            Difficulty::Normal => TetrisTuning {
                drop_interval_ms: 1000,
                line_score: 100,
            },
            Difficulty::Hard => TetrisTuning {
                drop_interval_ms: 700,
                line_score: 150,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeTuning {
    /// Milliseconds per movement step
    pub step_interval_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TetrisTuning {
    /// Milliseconds per forced drop
    pub drop_interval_ms: u32,
    /// Base score for one cleared line
    pub line_score: u64,
}

/// Snake grid size in cells (600px canvas / 20px cells)
pub const SNAKE_COLUMNS: i32 = 30;
pub const SNAKE_ROWS: i32 = 30;
pub const SNAKE_INITIAL_LENGTH: usize = 3;
pub const SCORE_PER_FOOD: u64 = 10;

/// Timed power-up effect length
pub const POWER_UP_EFFECT_MS: f64 = 5000.0;
/// First spawn delay; later spawns wait uniformly in [delay, 2 * delay)
pub const POWER_UP_SPAWN_DELAY_MS: f64 = 10_000.0;
/// Uncollected power-ups vanish after this long
pub const POWER_UP_LIFETIME_MS: f64 = 5000.0;

/// Interval change applied by speed/slow power-ups
pub const POWER_UP_INTERVAL_DELTA_MS: u32 = 30;
pub const MIN_SNAKE_INTERVAL_MS: u32 = 50;
pub const MAX_SNAKE_INTERVAL_MS: u32 = 300;

pub const SPEED_POWER_UP_SCORE: u64 = 15;
pub const POINTS_POWER_UP_SCORE: u64 = 30;
pub const SLOW_POWER_UP_SCORE: u64 = 20;

pub const TETRIS_WIDTH: usize = 10;
pub const TETRIS_HEIGHT: usize = 20;
/// Drop interval reduction per clearing event (not per line)
pub const DROP_SPEEDUP_MS: u32 = 10;
pub const MIN_DROP_INTERVAL_MS: u32 = 100;
pub const SOFT_DROP_SCORE: u64 = 1;

/// Line clear multipliers indexed by rows cleared in one lock
pub const LINE_CLEAR_MULTIPLIERS: [f64; 5] = [0.0, 1.0, 2.5, 4.0, 8.0];

/// Everything the snake engine needs at construction
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeConfig {
    pub columns: i32,
    pub rows: i32,
    pub initial_length: usize,
    pub step_interval_ms: u32,
    pub score_per_food: u64,
    pub power_up_spawn_delay_ms: f64,
    pub power_up_lifetime_ms: f64,
    pub power_up_effect_ms: f64,
}

impl SnakeConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            step_interval_ms: difficulty.snake().step_interval_ms,
            ..Self::default()
        }
    }

    /// Reject grids the engine cannot start on
    pub fn validate(&self) -> Result<(), ArcadeError> {
        if self.columns <= 0 || self.rows <= 0 {
            return Err(ArcadeError::InvalidBoard {
                width: self.columns.max(0) as usize,
                height: self.rows.max(0) as usize,
            });
        }
        // The body is laid out leftward from the center column
        let room = (self.columns / 2 + 1) as usize;
        if self.initial_length == 0 || self.initial_length > room {
            return Err(ArcadeError::InvalidSnakeLength {
                length: self.initial_length,
                columns: self.columns as usize,
            });
        }
        // Food needs at least one free cell
        if (self.columns as usize) * (self.rows as usize) <= self.initial_length {
            return Err(ArcadeError::InvalidBoard {
                width: self.columns as usize,
                height: self.rows as usize,
            });
        }
        if self.step_interval_ms == 0 {
            return Err(ArcadeError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            columns: SNAKE_COLUMNS,
            rows: SNAKE_ROWS,
            initial_length: SNAKE_INITIAL_LENGTH,
            step_interval_ms: Difficulty::Normal.snake().step_interval_ms,
            score_per_food: SCORE_PER_FOOD,
            power_up_spawn_delay_ms: POWER_UP_SPAWN_DELAY_MS,
            power_up_lifetime_ms: POWER_UP_LIFETIME_MS,
            power_up_effect_ms: POWER_UP_EFFECT_MS,
        }
    }
}

/// Everything the tetris engine needs at construction
#[derive(Debug, Clone, PartialEq)]
pub struct TetrisConfig {
    pub width: usize,
    pub height: usize,
    pub drop_interval_ms: u32,
    pub line_score: u64,
    pub drop_speedup_ms: u32,
    pub min_drop_interval_ms: u32,
}

impl TetrisConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let tuning = difficulty.tetris();
        Self {
            drop_interval_ms: tuning.drop_interval_ms,
            line_score: tuning.line_score,
            ..Self::default()
        }
    }

    /// Every canonical piece (widest is 4) must fit
    pub fn validate(&self) -> Result<(), ArcadeError> {
        if self.width < 4 || self.height < 4 {
            return Err(ArcadeError::InvalidBoard {
                width: self.width,
                height: self.height,
            });
        }
        if self.drop_interval_ms == 0 {
            return Err(ArcadeError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for TetrisConfig {
    fn default() -> Self {
        let tuning = Difficulty::Normal.tetris();
        Self {
            width: TETRIS_WIDTH,
            height: TETRIS_HEIGHT,
            drop_interval_ms: tuning.drop_interval_ms,
            line_score: tuning.line_score,
            drop_speedup_ms: DROP_SPEEDUP_MS,
            min_drop_interval_ms: MIN_DROP_INTERVAL_MS,
        }
    }
}

/// Score for clearing `lines` rows at once
pub fn line_clear_score(lines: u32, line_score: u64) -> u64 {
    let multiplier = match LINE_CLEAR_MULTIPLIERS.get(lines as usize) {
        Some(&m) if lines > 0 => m,
        Some(_) => return 0,
        None => 1.0,
    };
    (line_score as f64 * multiplier).floor() as u64
}
