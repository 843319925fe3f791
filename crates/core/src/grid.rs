//! Grid module - the playfield matrix
//!
//! The grid is a rows x cols matrix of [`Cell`] stored as a flat row-major
//! vector. The bottom row and the left/right columns are permanently
//! [`Cell::Wall`]; the top row is open so pieces can spawn there.
//!
//! Coordinates are `(row, col)` with row 0 on top. Every read and write goes
//! through [`Grid::cell_at`] / [`Grid::set_cell`], which are bounds-checked.
//! The signed probes ([`Grid::get`], [`Grid::is_blocked`]) exist for candidate
//! positions computed from piece offsets, which may fall outside the matrix.

use crate::error::{ConfigError, GridError};
use crate::types::Cell;

/// The playfield: settled blocks, walls and the active piece's `Moving` cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
}

impl Grid {
    /// Smallest allocation that still fits a 4x4 spawn box above the floor
    pub const MIN_ROWS: usize = 6;
    pub const MIN_COLS: usize = 6;

    /// Allocate a grid and fill it with walls and empty interior
    pub fn new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows < Self::MIN_ROWS || cols < Self::MIN_COLS {
            return Err(ConfigError::GridTooSmall {
                rows,
                cols,
                min_rows: Self::MIN_ROWS,
                min_cols: Self::MIN_COLS,
            });
        }

        let mut grid = Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        };
        grid.reset();
        Ok(grid)
    }

    /// Re-fill with `Wall` on the border and `Empty` everywhere else
    pub fn reset(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = if self.is_border(row, col) {
                    Cell::Wall
                } else {
                    Cell::Empty
                };
                self.cells[row * self.cols + col] = cell;
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row index of the bottom wall
    pub fn floor_row(&self) -> usize {
        self.rows - 1
    }

    /// Column range pieces can occupy (excludes both wall columns)
    pub fn interior_cols(&self) -> std::ops::Range<usize> {
        1..self.cols - 1
    }

    /// Row range pieces can occupy (excludes the bottom wall)
    pub fn interior_rows(&self) -> std::ops::Range<usize> {
        0..self.rows - 1
    }

    /// Whether `(row, col)` belongs to the permanent wall
    pub fn is_border(&self, row: usize, col: usize) -> bool {
        row == self.rows - 1 || col == 0 || col == self.cols - 1
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Read a cell; border cells are valid and return `Wall`
    pub fn cell_at(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    /// Write a cell; the border rejects every write with `ImmutableWall`
    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> Result<(), GridError> {
        let idx = self.index(row, col)?;
        if self.is_border(row, col) {
            return Err(GridError::ImmutableWall { row, col });
        }
        self.cells[idx] = value;
        Ok(())
    }

    /// Convert signed coordinates into a valid `(row, col)` pair
    pub fn checked_coords(&self, row: isize, col: isize) -> Option<(usize, usize)> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some((row, col))
    }

    /// Signed probe; `None` when the coordinates lie outside the matrix
    pub fn get(&self, row: isize, col: isize) -> Option<Cell> {
        let (row, col) = self.checked_coords(row, col)?;
        self.cell_at(row, col).ok()
    }

    /// Whether a piece cell may not enter `(row, col)`.
    ///
    /// Anything outside the matrix counts as blocked.
    pub fn is_blocked(&self, row: isize, col: isize) -> bool {
        self.get(row, col).map_or(true, |cell| cell.is_blocking())
    }

    /// Whether every interior cell of `row` holds `cell`
    pub fn is_row_filled_with(&self, row: usize, cell: Cell) -> Result<bool, GridError> {
        for col in self.interior_cols() {
            if self.cell_at(row, col)? != cell {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Overwrite every interior cell of `row`
    pub fn fill_row(&mut self, row: usize, cell: Cell) -> Result<(), GridError> {
        for col in self.interior_cols() {
            self.set_cell(row, col, cell)?;
        }
        Ok(())
    }

    /// Coordinates of every cell currently in state `cell`, row-major
    pub fn positions_of(&self, cell: Cell) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == cell)
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }

    /// Number of cells currently in state `cell`
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// A read-only view of one row
    pub fn row(&self, row: usize) -> Result<&[Cell], GridError> {
        let start = self.index(row, 0)?;
        Ok(&self.cells[start..start + self.cols])
    }

    /// Flat row-major view of the whole grid
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}
