//! Board module - the fixed tetris grid
//!
//! Flat row-major storage. Coordinates: (x, y) with x growing left to right
//! and y growing top (0) to bottom (height - 1).
//! Locked cells only change through line-clear compaction.

/// 0 = empty, 1..=7 = piece color index
pub type Cell = u8;

pub const EMPTY: Cell = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y), `None` if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Write a cell. Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(cell) if cell != EMPTY)
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.height && self.row(y).iter().all(|&cell| cell != EMPTY)
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != EMPTY).count()
    }

    /// Remove every full row and return how many went.
    ///
    /// Scans bottom to top. A removed row lets everything above it drop by
    /// one and an empty row appears at the top; the same index is then
    /// checked again. No cap on the count.
    pub fn clear_lines(&mut self) -> u32 {
        let width = self.width;
        let mut cleared = 0;
        let mut y = self.height;

        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                // copy_within handles the overlapping ranges
                self.cells.copy_within(0..row * width, width);
                self.cells[..width].fill(EMPTY);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Build from rows of cell values
    #[cfg(test)]
    pub fn from_rows(rows: &[Vec<Cell>]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            assert_eq!(row.len(), width, "ragged board rows");
            cells.extend_from_slice(row);
        }
        Self {
            width,
            height,
            cells,
        }
    }
}
