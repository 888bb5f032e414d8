//! Matrix module - the playfield grid.
//!
//! 10 columns by 24 rows stored as a flat array; rows 0..4 are the hidden
//! buffer above the visible skyline and take part in collision and line
//! clearing exactly like visible rows. Cells above the matrix (row < 0) are
//! legal piece positions: they are bounds-checked on columns but exempt from
//! collision, which lets a piece rest partially above the skyline.
//!
//! Coordinates are (row, col) with rows growing downward.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, COLS, ROWS};

const MATRIX_SIZE: usize = COLS * ROWS;

/// The playfield. Owned by the session; mutated only by lock and line clear.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Flat row-major storage (row * COLS + col).
    cells: [Cell; MATRIX_SIZE],
}

impl Matrix {
    pub fn new() -> Self {
        Self {
            cells: [None; MATRIX_SIZE],
        }
    }

    #[inline(always)]
    fn index(row: i8, col: i8) -> Option<usize> {
        if col < 0 || col >= COLS as i8 || row < 0 || row >= ROWS as i8 {
            return None;
        }
        Some(row as usize * COLS + col as usize)
    }

    /// Get the cell at (row, col); None when out of bounds.
    pub fn get(&self, row: i8, col: i8) -> Option<Cell> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Set the cell at (row, col). Returns false when out of bounds.
    pub fn set(&mut self, row: i8, col: i8, cell: Cell) -> bool {
        match Self::index(row, col) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    pub fn is_occupied(&self, row: i8, col: i8) -> bool {
        matches!(self.get(row, col), Some(Some(_)))
    }

    /// Validate a full piece position. Columns must be in bounds and rows
    /// must not pass the floor; cells at row >= 0 must also be empty.
    pub fn is_valid_position(&self, cells: &[(i8, i8)]) -> bool {
        cells.iter().all(|&(row, col)| {
            if col < 0 || col >= COLS as i8 || row >= ROWS as i8 {
                return false;
            }
            row < 0 || !self.is_occupied(row, col)
        })
    }

    /// T-spin corner probe: walls and the floor count as filled.
    pub fn corner_filled(&self, row: i8, col: i8) -> bool {
        match Self::index(row, col) {
            Some(idx) => self.cells[idx].is_some(),
            None => true,
        }
    }

    /// Write a piece into the grid. Cells above the matrix are dropped
    /// silently; the caller must have validated the position.
    pub fn lock(&mut self, cells: &[(i8, i8)], kind: PieceKind) {
        for &(row, col) in cells {
            if row >= 0 {
                self.set(row, col, Some(kind));
            }
        }
    }

    fn is_row_full(&self, row: usize) -> bool {
        let start = row * COLS;
        self.cells[start..start + COLS].iter().all(|c| c.is_some())
    }

    /// Remove every full row at once, gravitating the remainder down and
    /// backfilling empty rows at the top. Returns the cleared row indices
    /// sorted bottom to top; pair with `is_empty` for perfect-clear checks.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, 4> {
        let mut cleared = ArrayVec::new();
        let mut write_row = ROWS;

        for read_row in (0..ROWS).rev() {
            if self.is_row_full(read_row) {
                cleared.push(read_row);
            } else {
                write_row -= 1;
                if write_row != read_row {
                    let src = read_row * COLS;
                    let dst = write_row * COLS;
                    self.cells.copy_within(src..src + COLS, dst);
                }
            }
        }

        for row in 0..write_row {
            let start = row * COLS;
            for cell in &mut self.cells[start..start + COLS] {
                *cell = None;
            }
        }

        cleared
    }

    /// True when no cell is occupied (perfect-clear condition after a clear).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_none())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Height of one column: distance from its topmost filled cell to the floor.
    fn column_height(&self, col: usize) -> u32 {
        for row in 0..ROWS {
            if self.cells[row * COLS + col].is_some() {
                return (ROWS - row) as u32;
            }
        }
        0
    }

    /// Sum of all column heights.
    pub fn aggregate_height(&self) -> u32 {
        (0..COLS).map(|col| self.column_height(col)).sum()
    }

    /// Number of currently complete rows (before clearing).
    pub fn complete_lines(&self) -> u32 {
        (0..ROWS).filter(|&row| self.is_row_full(row)).count() as u32
    }

    /// Empty cells with at least one filled cell above them in the same column.
    pub fn count_holes(&self) -> u32 {
        let mut holes = 0;
        for col in 0..COLS {
            let mut roof_seen = false;
            for row in 0..ROWS {
                if self.cells[row * COLS + col].is_some() {
                    roof_seen = true;
                } else if roof_seen {
                    holes += 1;
                }
            }
        }
        holes
    }

    /// Sum of absolute height differences between adjacent columns.
    pub fn bumpiness(&self) -> u32 {
        let mut total = 0;
        let mut prev = self.column_height(0);
        for col in 1..COLS {
            let h = self.column_height(col);
            total += prev.abs_diff(h);
            prev = h;
        }
        total
    }

    /// Weighted stack evaluation over (aggregate height, complete lines,
    /// holes, bumpiness), for external placement search.
    pub fn evaluate(&self, weights: [f32; 4]) -> f32 {
        let [a, b, c, d] = weights;
        a * self.aggregate_height() as f32
            + b * self.complete_lines() as f32
            + c * self.count_holes() as f32
            + d * self.bumpiness() as f32
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}
