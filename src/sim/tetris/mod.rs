//! Tetris engine
//!
//! One active piece falls on a fixed drop interval. A blocked drop locks the
//! piece, compacts full rows and spawns the next piece; a spawn that is
//! immediately blocked ends the game.

pub mod board;
pub mod pieces;

pub use board::{Board, Cell, EMPTY};
pub use pieces::{PieceKind, Shape};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::engine::{Action, Engine, GameKind, GamePhase, GameView};
use super::events::{GameEvent, Sound, Stat};
use crate::error::ArcadeError;
use crate::tuning::{SOFT_DROP_SCORE, TetrisConfig, line_clear_score};

/// Horizontal offsets tried, in order, when a rotation does not fit
pub const WALL_KICKS: [i32; 4] = [-1, 1, -2, 2];

/// The falling piece. Its matrix is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Clockwise quarter turns from the canonical orientation (0-3)
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    pub fn shape(&self) -> Shape {
        self.kind.shape(self.rotation)
    }

    /// Absolute board coordinates of the filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x, y) = (self.x, self.y);
        let shape = self.shape();
        let cells: Vec<(i32, i32)> = shape.filled().map(|(dx, dy)| (x + dx, y + dy)).collect();
        cells.into_iter()
    }
}

#[derive(Debug)]
pub struct TetrisGame {
    config: TetrisConfig,
    rng: Pcg32,
    board: Board,
    piece: Option<ActivePiece>,
    drop_interval_ms: u32,
    accumulator_ms: f64,
    score: u64,
    lines_cleared: u64,
    pieces_locked: u64,
    phase: GamePhase,
    events: Vec<GameEvent>,
}

impl TetrisGame {
    pub fn new(config: TetrisConfig, seed: u64) -> Result<Self, ArcadeError> {
        config.validate()?;
        let mut game = Self {
            board: Board::new(config.width, config.height),
            drop_interval_ms: config.drop_interval_ms,
            config,
            rng: Pcg32::seed_from_u64(seed),
            piece: None,
            accumulator_ms: 0.0,
            score: 0,
            lines_cleared: 0,
            pieces_locked: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
        };
        game.start_run();
        Ok(game)
    }

    fn start_run(&mut self) {
        self.board.clear();
        self.piece = None;
        self.drop_interval_ms = self.config.drop_interval_ms;
        self.accumulator_ms = 0.0;
        self.score = 0;
        self.lines_cleared = 0;
        self.pieces_locked = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();
        self.spawn_next();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn lines_cleared(&self) -> u64 {
        self.lines_cleared
    }

    pub fn pieces_locked(&self) -> u64 {
        self.pieces_locked
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether `shape` fits with its origin at (x, y).
    ///
    /// Columns must stay inside the board and rows must not pass the bottom.
    /// Cells above the top row are allowed and skip the overlap check.
    pub fn fits(&self, shape: &Shape, x: i32, y: i32) -> bool {
        let width = self.board.width() as i32;
        let height = self.board.height() as i32;
        shape.filled().all(|(dx, dy)| {
            let (cx, cy) = (x + dx, y + dy);
            if cx < 0 || cx >= width || cy >= height {
                return false;
            }
            cy < 0 || !self.board.is_occupied(cx, cy)
        })
    }

    /// Shift the active piece. No change and false if blocked.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        let Some(piece) = self.piece else {
            return false;
        };
        if !self.fits(&piece.shape(), piece.x + dx, piece.y + dy) {
            return false;
        }
        self.piece = Some(ActivePiece {
            x: piece.x + dx,
            y: piece.y + dy,
            ..piece
        });
        true
    }

    /// Quarter turn clockwise with horizontal wall kicks.
    ///
    /// The square piece never rotates. If neither the plain rotation nor any
    /// kick fits, the piece keeps its previous shape and position.
    pub fn rotate(&mut self) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        let Some(piece) = self.piece else {
            return false;
        };
        if piece.kind.is_square() {
            return false;
        }

        let rotation = (piece.rotation + 1) % 4;
        let shape = piece.kind.shape(rotation);
        let offset = std::iter::once(0)
            .chain(WALL_KICKS)
            .find(|&dx| self.fits(&shape, piece.x + dx, piece.y));

        match offset {
            Some(dx) => {
                self.piece = Some(ActivePiece {
                    rotation,
                    x: piece.x + dx,
                    ..piece
                });
                true
            }
            None => false,
        }
    }

    /// Move down one row, awarding the soft-drop bonus on success
    pub fn soft_drop(&mut self) -> bool {
        if self.try_move(0, 1) {
            self.add_score(SOFT_DROP_SCORE);
            true
        } else {
            false
        }
    }

    /// Row the active piece would land on if dropped now
    pub fn ghost_row(&self) -> Option<i32> {
        let piece = self.piece?;
        let shape = piece.shape();
        let mut y = piece.y;
        while self.fits(&shape, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::Stat {
            stat: Stat::Score,
            value: self.score,
        });
    }

    /// Spawn a uniformly random piece
    fn spawn_next(&mut self) -> bool {
        let kind = PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())];
        self.spawn(kind)
    }

    /// Place `kind` centered on row 0. A blocked spawn ends the game.
    fn spawn(&mut self, kind: PieceKind) -> bool {
        let shape = kind.canonical();
        let x = (self.board.width() as i32 - shape.cols() as i32).div_euclid(2);
        let piece = ActivePiece {
            kind,
            rotation: 0,
            x,
            y: 0,
        };

        if !self.fits(&shape, piece.x, piece.y) {
            self.game_over();
            return false;
        }
        self.piece = Some(piece);
        true
    }

    /// Write the active piece's color into the board
    fn lock(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        let color = piece.kind.color();
        for (x, y) in piece.cells() {
            // Cells above the top row have nowhere to go
            self.board.set(x, y, color);
        }
        self.pieces_locked += 1;
    }

    fn lock_and_continue(&mut self) {
        self.lock();

        let cleared = self.board.clear_lines();
        if cleared > 0 {
            self.lines_cleared += cleared as u64;
            self.add_score(line_clear_score(cleared, self.config.line_score));
            self.drop_interval_ms = self
                .drop_interval_ms
                .saturating_sub(self.config.drop_speedup_ms)
                .max(self.config.min_drop_interval_ms);

            self.events.push(GameEvent::Sound(Sound::LineClear));
            self.events.push(GameEvent::Stat {
                stat: Stat::First,
                value: self.lines_cleared,
            });
            self.events.push(GameEvent::Stat {
                stat: Stat::Lines,
                value: self.lines_cleared,
            });
            log::debug!(
                "Cleared {} line(s), total {}, drop interval {}ms",
                cleared,
                self.lines_cleared,
                self.drop_interval_ms
            );
        }

        self.spawn_next();
    }

    fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.piece = None;
        self.events.push(GameEvent::Sound(Sound::Collision));
        self.events.push(GameEvent::GameOver { score: self.score });
        log::info!(
            "Tetris over: score {}, lines {}, pieces {}",
            self.score,
            self.lines_cleared,
            self.pieces_locked
        );
    }
}

impl Engine for TetrisGame {
    fn kind(&self) -> GameKind {
        GameKind::Tetris
    }

    fn update(&mut self, dt_ms: f64) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        self.accumulator_ms += dt_ms;
        if self.accumulator_ms >= self.drop_interval_ms as f64 {
            if !self.try_move(0, 1) {
                self.lock_and_continue();
            }
            self.accumulator_ms = 0.0;
        }
    }

    fn apply(&mut self, action: Action) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        match action {
            Action::MoveLeft => {
                self.try_move(-1, 0);
                self.events.push(GameEvent::Sound(Sound::Move));
            }
            Action::MoveRight => {
                self.try_move(1, 0);
                self.events.push(GameEvent::Sound(Sound::Move));
            }
            Action::SoftDrop => {
                self.soft_drop();
            }
            Action::Rotate => {
                self.rotate();
                self.events.push(GameEvent::Sound(Sound::Rotate));
            }
            Action::Turn(_) => {}
        }
    }

    fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    fn reset(&mut self) {
        self.start_run();
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn view(&self) -> GameView<'_> {
        GameView::Tetris(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn game_with(kind: PieceKind) -> TetrisGame {
        let mut game = TetrisGame::new(TetrisConfig::default(), 11).unwrap();
        game.piece = None;
        assert!(game.spawn(kind));
        game
    }

    fn tick(game: &mut TetrisGame) {
        let interval = game.drop_interval_ms() as f64;
        game.update(interval);
    }

    #[test]
    fn test_spawn_centered() {
        let game = game_with(PieceKind::I);
        let piece = game.piece().unwrap();
        assert_eq!((piece.x, piece.y, piece.rotation), (3, 0, 0));

        let game = game_with(PieceKind::O);
        assert_eq!(game.piece().unwrap().x, 4);

        let game = game_with(PieceKind::T);
        assert_eq!(game.piece().unwrap().x, 3);
    }

    #[test]
    fn test_i_piece_falls_and_locks_on_bottom() {
        let mut game = game_with(PieceKind::I);
        for _ in 0..19 {
            tick(&mut game);
        }
        assert_eq!(game.piece().unwrap().y, 19);
        assert_eq!(game.board().filled_count(), 0);

        // Blocked drop locks
        tick(&mut game);
        assert_eq!(game.pieces_locked(), 1);
        assert_eq!(game.board().row(19), &[0, 0, 0, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(game.lines_cleared(), 0);
        assert_eq!(game.score(), 0);
        assert!(!game.is_game_over());
        assert_eq!(game.piece().unwrap().y, 0);
    }

    #[test]
    fn test_update_below_interval_does_nothing() {
        let mut game = game_with(PieceKind::T);
        game.update(999.0);
        assert_eq!(game.piece().unwrap().y, 0);
        game.update(1.0);
        assert_eq!(game.piece().unwrap().y, 1);
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let mut game = game_with(PieceKind::O);
        for _ in 0..4 {
            assert!(game.try_move(-1, 0));
        }
        assert!(!game.try_move(-1, 0));
        assert_eq!(game.piece().unwrap().x, 0);
    }

    #[test]
    fn test_move_blocked_by_board() {
        let mut game = game_with(PieceKind::O);
        game.board.set(4, 2, 3);
        assert!(!game.try_move(0, 1));
        assert_eq!(game.piece().unwrap().y, 0);
        assert!(game.try_move(-2, 0));
        assert!(game.try_move(0, 1));
    }

    #[test]
    fn test_square_never_rotates() {
        let mut game = game_with(PieceKind::O);
        let before = *game.piece().unwrap();
        assert!(!game.rotate());
        assert_eq!(*game.piece().unwrap(), before);
    }

    #[test]
    fn test_rotation_in_open_space() {
        let mut game = game_with(PieceKind::I);
        assert!(game.rotate());
        let piece = game.piece().unwrap();
        assert_eq!((piece.rotation, piece.x, piece.y), (1, 3, 0));
        let shape = piece.shape();
        assert_eq!((shape.rows(), shape.cols()), (4, 1));
    }

    #[test]
    fn test_wall_kick_order() {
        let mut game = game_with(PieceKind::I);
        game.rotate();
        // Upright I against column 8: flat at x=8, 7, 9 all overflow
        for _ in 0..5 {
            assert!(game.try_move(1, 0));
        }
        assert_eq!(game.piece().unwrap().x, 8);

        assert!(game.rotate());
        let piece = game.piece().unwrap();
        assert_eq!((piece.rotation, piece.x), (2, 6));
    }

    #[test]
    fn test_rotation_discarded_when_no_kick_fits() {
        let mut game = game_with(PieceKind::I);
        game.rotate();
        for _ in 0..6 {
            game.try_move(1, 0);
        }
        assert_eq!(game.piece().unwrap().x, 9);

        let before = *game.piece().unwrap();
        assert!(!game.rotate());
        assert_eq!(*game.piece().unwrap(), before);
    }

    #[test]
    fn test_rotating_one_piece_leaves_next_spawn_canonical() {
        let mut game = game_with(PieceKind::T);
        game.rotate();
        game.piece = None;
        game.spawn(PieceKind::T);
        assert_eq!(game.piece().unwrap().rotation, 0);
        assert_eq!(game.piece().unwrap().shape(), PieceKind::T.canonical());
    }

    #[test]
    fn test_single_line_clear_scores_and_speeds_up() {
        let mut game = game_with(PieceKind::I);
        for x in [0, 1, 2, 7, 8, 9] {
            game.board.set(x, 19, 2);
        }
        while game.pieces_locked() == 0 {
            tick(&mut game);
        }

        assert_eq!(game.lines_cleared(), 1);
        assert_eq!(game.score(), 100);
        assert_eq!(game.drop_interval_ms(), 990);
        assert_eq!(game.board().filled_count(), 0);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Sound(Sound::LineClear)));
        assert!(events.contains(&GameEvent::Stat {
            stat: Stat::Lines,
            value: 1
        }));
        assert!(events.contains(&GameEvent::Stat {
            stat: Stat::First,
            value: 1
        }));
    }

    #[test]
    fn test_double_clear_speeds_up_once() {
        let mut game = game_with(PieceKind::O);
        for y in [18, 19] {
            for x in (0..10).filter(|x| *x != 4 && *x != 5) {
                game.board.set(x, y, 6);
            }
        }
        while game.pieces_locked() == 0 {
            tick(&mut game);
        }
        assert_eq!(game.lines_cleared(), 2);
        assert_eq!(game.score(), 250);
        assert_eq!(game.drop_interval_ms(), 990);
    }

    #[test]
    fn test_drop_interval_floor() {
        let config = TetrisConfig {
            drop_interval_ms: 105,
            ..TetrisConfig::default()
        };
        let mut game = TetrisGame::new(config, 1).unwrap();
        game.piece = None;
        game.spawn(PieceKind::I);
        for x in [0, 1, 2, 7, 8, 9] {
            game.board.set(x, 19, 2);
        }
        while game.pieces_locked() == 0 {
            tick(&mut game);
        }
        assert_eq!(game.drop_interval_ms(), 100);
    }

    #[test]
    fn test_soft_drop_bonus() {
        let mut game = game_with(PieceKind::T);
        game.apply(Action::SoftDrop);
        assert_eq!(game.piece().unwrap().y, 1);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut game = game_with(PieceKind::I);
        // Flat I at the top-left, row 1 nearly full underneath
        game.piece = Some(ActivePiece {
            kind: PieceKind::I,
            rotation: 0,
            x: 0,
            y: 0,
        });
        for x in 0..9 {
            game.board.set(x, 1, 4);
        }

        tick(&mut game);
        assert!(game.is_game_over());
        assert!(game.piece().is_none());
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));

        // Terminal until reset
        let board = game.board().clone();
        tick(&mut game);
        game.apply(Action::MoveLeft);
        assert_eq!(game.board(), &board);
        assert!(game.drain_events().is_empty());

        game.reset();
        assert!(!game.is_game_over());
        assert_eq!(game.board().filled_count(), 0);
        assert!(game.piece().is_some());
    }

    #[test]
    fn test_ghost_row() {
        let mut game = game_with(PieceKind::O);
        assert_eq!(game.ghost_row(), Some(18));
        game.board.set(4, 10, 1);
        assert_eq!(game.ghost_row(), Some(8));
    }

    fn action_strategy() -> impl Strategy<Value = Option<Action>> {
        prop_oneof![
            Just(Some(Action::MoveLeft)),
            Just(Some(Action::MoveRight)),
            Just(Some(Action::SoftDrop)),
            Just(Some(Action::Rotate)),
            Just(None),
        ]
    }

    proptest! {
        #[test]
        fn prop_piece_in_bounds_and_locked_cells_stable(
            seed in any::<u64>(),
            actions in proptest::collection::vec(action_strategy(), 1..400),
        ) {
            let mut game = TetrisGame::new(TetrisConfig::default(), seed).unwrap();
            for action in actions {
                let board_before = game.board().clone();
                let lines_before = game.lines_cleared();

                match action {
                    Some(action) => game.apply(action),
                    None => tick(&mut game),
                }

                if let Some(piece) = game.piece() {
                    for (x, y) in piece.cells() {
                        prop_assert!((0..10).contains(&x) && (0..20).contains(&y));
                        prop_assert!(!game.board().is_occupied(x, y));
                    }
                }

                // Without a clear, locked cells never change
                if game.lines_cleared() == lines_before {
                    for y in 0..20 {
                        for x in 0..10 {
                            let before = board_before.get(x, y).unwrap();
                            if before != EMPTY {
                                prop_assert_eq!(game.board().get(x, y), Some(before));
                            }
                        }
                    }
                }

                if game.is_game_over() {
                    break;
                }
            }
        }
    }
}
