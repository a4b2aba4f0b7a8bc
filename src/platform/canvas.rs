//! Canvas 2D renderer (WASM only)
//!
//! Reads the game view each frame and repaints the whole canvas. Nothing
//! here feeds back into the simulation.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::*;
use crate::error::ArcadeError;
use crate::session::{Hud, Renderer};
use crate::sim::{GameView, SnakeGame, TetrisGame};

/// Ghost piece opacity
const GHOST_ALPHA: f64 = 0.25;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Look up `<canvas id="{canvas_id}">` and its 2D context
    pub fn new(canvas_id: &str) -> Result<Self, ArcadeError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(ArcadeError::NoWindow)?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or(ArcadeError::MissingCanvas)?
            .dyn_into()
            .map_err(|_| ArcadeError::MissingCanvas)?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(ArcadeError::MissingContext)?;
        Ok(Self { canvas, ctx })
    }

    /// Resize the canvas for a game's grid
    pub fn fit(&self, view: GameView<'_>) {
        let (w, h) = match view {
            GameView::Snake(snake) => (
                snake.columns() as u32 * SNAKE_CELL_PX,
                snake.rows() as u32 * SNAKE_CELL_PX,
            ),
            GameView::Tetris(tetris) => (
                tetris.board().width() as u32 * TETRIS_BLOCK_PX,
                tetris.board().height() as u32 * TETRIS_BLOCK_PX,
            ),
        };
        self.canvas.set_width(w);
        self.canvas.set_height(h);
    }

    fn cell(&self, x: i32, y: i32, size: u32, color: &str) {
        let size = size as f64;
        self.ctx.set_fill_style_str(color);
        // 1px gap between cells
        self.ctx
            .fill_rect(x as f64 * size, y as f64 * size, size - 1.0, size - 1.0);
    }

    fn clear(&self) {
        self.ctx.set_fill_style_str(COLOR_BACKGROUND);
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn draw_snake(&self, snake: &SnakeGame) {
        for (i, segment) in snake.body().iter().enumerate() {
            let color = if i == 0 { COLOR_SNAKE_HEAD } else { COLOR_SNAKE };
            self.cell(segment.x, segment.y, SNAKE_CELL_PX, color);
        }
        let food = snake.food();
        self.cell(food.x, food.y, SNAKE_CELL_PX, COLOR_FOOD);
        if let Some(power_up) = snake.power_up() {
            self.cell(
                power_up.position.x,
                power_up.position.y,
                SNAKE_CELL_PX,
                COLOR_POWER_UP,
            );
        }
    }

    fn draw_tetris(&self, tetris: &TetrisGame) {
        let board = tetris.board();
        for (y, row) in board.rows().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let color = match cell {
                    0 => COLOR_GRID,
                    c => PIECE_COLORS[(c as usize - 1) % PIECE_COLORS.len()],
                };
                self.cell(x as i32, y as i32, TETRIS_BLOCK_PX, color);
            }
        }

        let Some(piece) = tetris.piece() else { return };
        let color = PIECE_COLORS[piece.kind.index()];

        if let Some(ghost_y) = tetris.ghost_row() {
            self.ctx.set_global_alpha(GHOST_ALPHA);
            for (x, y) in piece.cells() {
                self.cell(x, y - piece.y + ghost_y, TETRIS_BLOCK_PX, color);
            }
            self.ctx.set_global_alpha(1.0);
        }
        for (x, y) in piece.cells() {
            self.cell(x, y, TETRIS_BLOCK_PX, color);
        }
    }

    fn overlay(&self, title: &str, lines: &[String]) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.set_global_alpha(0.7);
        self.ctx.set_fill_style_str(COLOR_BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, w, h);
        self.ctx.set_global_alpha(1.0);

        self.ctx.set_fill_style_str("#ffffff");
        self.ctx.set_text_align("center");
        self.ctx.set_font("bold 32px sans-serif");
        let _ = self.ctx.fill_text(title, w / 2.0, h / 2.0 - 30.0);
        self.ctx.set_font("16px sans-serif");
        for (i, line) in lines.iter().enumerate() {
            let _ = self.ctx.fill_text(line, w / 2.0, h / 2.0 + 10.0 + 24.0 * i as f64);
        }
    }
}

impl Renderer for CanvasRenderer {
    fn render(&mut self, view: GameView<'_>, hud: &Hud) {
        self.clear();
        match view {
            GameView::Snake(snake) => self.draw_snake(snake),
            GameView::Tetris(tetris) => self.draw_tetris(tetris),
        }

        if let Some(summary) = hud.game_over {
            let mut lines = vec![
                format!("Score: {}", summary.score),
                format!("High Score: {}", summary.high_score),
            ];
            if summary.new_high_score {
                lines.push("New High Score!".to_string());
            }
            lines.push("R to restart, Esc for menu".to_string());
            self.overlay("Game Over", &lines);
        } else if hud.paused {
            self.overlay("Paused", &["Space to resume".to_string()]);
        }
    }
}
