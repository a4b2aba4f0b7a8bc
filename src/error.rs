//! Construction and configuration faults
//!
//! Invalid moves and game over are normal control flow and never show up
//! here. These errors abort a session before it starts.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArcadeError {
    #[error("unknown game type: {0}")]
    UnknownGame(String),
    #[error("invalid board dimensions {width}x{height}")]
    InvalidBoard { width: usize, height: usize },
    #[error("initial snake length {length} does not fit a {columns}-column grid")]
    InvalidSnakeLength { length: usize, columns: usize },
    #[error("tick interval must be positive")]
    InvalidInterval,
    #[error("browser window unavailable")]
    NoWindow,
    #[error("game canvas not found")]
    MissingCanvas,
    #[error("could not get canvas context")]
    MissingContext,
    #[error("local storage unavailable")]
    StorageUnavailable,
}
