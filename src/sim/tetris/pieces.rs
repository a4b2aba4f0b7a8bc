//! Tetromino shapes
//!
//! The canonical table is immutable. A piece's current matrix is derived
//! from its kind and a rotation index (0-3), so rotating one piece never
//! changes the base orientation of later pieces of the same kind.

use serde::{Deserialize, Serialize};

/// Largest matrix edge of any tetromino
pub const MAX_SHAPE_EDGE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

/// Canonical spawn orientations, rows top to bottom
const CANONICAL: [&[&[u8]]; 7] = [
    &[&[1, 1, 1, 1]],            // I
    &[&[1, 0, 0], &[1, 1, 1]],   // J
    &[&[0, 0, 1], &[1, 1, 1]],   // L
    &[&[1, 1], &[1, 1]],         // O
    &[&[0, 1, 1], &[1, 1, 0]],   // S
    &[&[0, 1, 0], &[1, 1, 1]],   // T
    &[&[1, 1, 0], &[0, 1, 1]],   // Z
];

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Board cell value written when this piece locks (1..=7)
    pub fn color(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Whether rotation is a no-op for this kind
    pub fn is_square(self) -> bool {
        self == PieceKind::O
    }

    pub fn canonical(self) -> Shape {
        Shape::from_rows(CANONICAL[self.index()])
    }

    /// Matrix after `rotation` clockwise quarter turns of the canonical shape
    pub fn shape(self, rotation: u8) -> Shape {
        let mut shape = self.canonical();
        for _ in 0..rotation % 4 {
            shape = shape.rotated();
        }
        shape
    }
}

/// Small boolean matrix, at most 4x4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    rows: usize,
    cols: usize,
    cells: [[bool; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE],
}

impl Shape {
    fn from_rows(rows: &[&[u8]]) -> Self {
        let mut cells = [[false; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                cells[r][c] = value != 0;
            }
        }
        Self {
            rows: rows.len(),
            cols: rows.first().map_or(0, |row| row.len()),
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row][col]
    }

    /// Quarter turn clockwise: transpose, then reverse each new row
    pub fn rotated(&self) -> Shape {
        let mut cells = [[false; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE];
        for (i, row) in cells.iter_mut().enumerate().take(self.cols) {
            for (j, cell) in row.iter_mut().enumerate().take(self.rows) {
                *cell = self.cells[self.rows - 1 - j][i];
            }
        }
        Shape {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Filled cells as (column, row) offsets from the shape origin
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_rows(shape: &Shape) -> Vec<Vec<u8>> {
        (0..shape.rows())
            .map(|r| {
                (0..shape.cols())
                    .map(|c| shape.is_filled(r, c) as u8)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in 0..4 {
                assert_eq!(kind.shape(rotation).filled().count(), 4, "{:?}", kind);
            }
        }
    }

    #[test]
    fn test_color_indices() {
        assert_eq!(PieceKind::I.color(), 1);
        assert_eq!(PieceKind::Z.color(), 7);
        assert_eq!(PieceKind::ALL[3], PieceKind::O);
        assert_eq!(PieceKind::O.index(), 3);
    }

    #[test]
    fn test_i_rotation_dimensions() {
        let flat = PieceKind::I.shape(0);
        assert_eq!((flat.rows(), flat.cols()), (1, 4));
        let upright = PieceKind::I.shape(1);
        assert_eq!((upright.rows(), upright.cols()), (4, 1));
    }

    #[test]
    fn test_j_rotates_clockwise() {
        assert_eq!(
            as_rows(&PieceKind::J.shape(1)),
            vec![vec![1, 1], vec![1, 0], vec![1, 0]]
        );
        assert_eq!(
            as_rows(&PieceKind::J.shape(2)),
            vec![vec![1, 1, 1], vec![0, 0, 1]]
        );
    }

    #[test]
    fn test_four_turns_is_identity() {
        for kind in PieceKind::ALL {
            let mut shape = kind.canonical();
            for _ in 0..4 {
                shape = shape.rotated();
            }
            assert_eq!(shape, kind.canonical());
            assert_eq!(kind.shape(4), kind.canonical());
        }
    }

    #[test]
    fn test_canonical_table_untouched_by_rotation() {
        let before = PieceKind::T.canonical();
        let _ = PieceKind::T.shape(1).rotated();
        assert_eq!(PieceKind::T.canonical(), before);
        assert_eq!(as_rows(&before), vec![vec![0, 1, 0], vec![1, 1, 1]]);
    }

    #[test]
    fn test_square_rotation_is_same_matrix() {
        assert!(PieceKind::O.is_square());
        assert_eq!(PieceKind::O.shape(1), PieceKind::O.shape(0));
    }
}
