//! Line clear engine - detect, mark and remove completed rows
//!
//! Clearing is two-phase. `scan_and_mark` finds every complete row in one
//! pass and turns it `Fading`; after the fade window `remove_marked` compacts
//! the grid. Nothing shifts until every complete row has been found, so no row
//! is counted twice.

use log::debug;

use crate::error::GridError;
use crate::grid::Grid;
use crate::types::Cell;

#[derive(Debug, Clone, Default)]
pub struct LineClearEngine {
    /// Rows currently `Fading`, top to bottom
    marked: Vec<usize>,
    fade_counter: u32,
}

impl LineClearEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.marked.clear();
        self.fade_counter = 0;
    }

    /// A row is complete when every interior column is `Full`
    pub fn is_complete(grid: &Grid, row: usize) -> Result<bool, GridError> {
        grid.is_row_filled_with(row, Cell::Full)
    }

    /// Mark every complete row `Fading` and return their indices, top to bottom
    pub fn scan_and_mark(&mut self, grid: &mut Grid) -> Result<&[usize], GridError> {
        let mut found = Vec::new();
        for row in grid.interior_rows() {
            if Self::is_complete(grid, row)? {
                found.push(row);
            }
        }

        for &row in &found {
            grid.fill_row(row, Cell::Fading)?;
        }

        if !found.is_empty() {
            debug!("marked rows {:?}", found);
            self.marked.extend(found);
            self.marked.sort_unstable();
            self.marked.dedup();
            self.fade_counter = 0;
        }
        Ok(&self.marked)
    }

    /// Whether rows are waiting to be removed
    pub fn is_pending(&self) -> bool {
        !self.marked.is_empty()
    }

    pub fn marked_rows(&self) -> &[usize] {
        &self.marked
    }

    pub fn fade_counter(&self) -> u32 {
        self.fade_counter
    }

    /// Count one fade tick; removes the marked rows once `fade_ticks` elapse.
    /// Returns the number of rows removed this call.
    pub fn advance(&mut self, grid: &mut Grid, fade_ticks: u32) -> Result<usize, GridError> {
        if !self.is_pending() {
            return Ok(0);
        }
        self.fade_counter += 1;
        if self.fade_counter < fade_ticks {
            return Ok(0);
        }
        self.remove_marked(grid)
    }

    /// Remove every marked row; rows above drop by the number of removed rows
    /// beneath them and the vacated top rows become `Empty`
    pub fn remove_marked(&mut self, grid: &mut Grid) -> Result<usize, GridError> {
        if self.marked.is_empty() {
            return Ok(0);
        }

        let cols = grid.interior_cols();
        let mut write = grid.floor_row();
        for read in grid.interior_rows().rev() {
            if self.marked.binary_search(&read).is_ok() {
                continue;
            }
            write -= 1;
            if write != read {
                for col in cols.clone() {
                    let cell = grid.cell_at(read, col)?;
                    grid.set_cell(write, col, cell)?;
                }
            }
        }

        for row in 0..write {
            grid.fill_row(row, Cell::Empty)?;
        }

        let removed = self.marked.len();
        debug!("removed {} rows {:?}", removed, self.marked);
        self.reset();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(21, 12).unwrap()
    }

    #[test]
    fn test_single_complete_row() {
        let mut grid = grid();
        grid.fill_row(19, Cell::Full).unwrap();
        grid.set_cell(18, 3, Cell::Full).unwrap();

        let mut engine = LineClearEngine::new();
        assert_eq!(engine.scan_and_mark(&mut grid).unwrap(), &[19]);
        assert!(grid.is_row_filled_with(19, Cell::Fading).unwrap());
        assert!(engine.is_pending());

        assert_eq!(engine.remove_marked(&mut grid).unwrap(), 1);
        assert_eq!(grid.cell_at(19, 3), Ok(Cell::Full));
        assert_eq!(grid.count(Cell::Full), 1);
        assert!(grid.is_row_filled_with(0, Cell::Empty).unwrap());
        assert!(!engine.is_pending());
    }

    #[test]
    fn test_incomplete_row_is_ignored() {
        let mut grid = grid();
        grid.fill_row(19, Cell::Full).unwrap();
        grid.set_cell(19, 10, Cell::Empty).unwrap();

        let mut engine = LineClearEngine::new();
        assert!(engine.scan_and_mark(&mut grid).unwrap().is_empty());
        assert!(!engine.is_pending());
    }

    #[test]
    fn test_split_rows_shift_by_rows_beneath() {
        let mut grid = grid();
        // Complete rows 19 and 17 with sentinels on 18, 16 and 10.
        grid.fill_row(19, Cell::Full).unwrap();
        grid.fill_row(17, Cell::Full).unwrap();
        grid.set_cell(18, 1, Cell::Full).unwrap();
        grid.set_cell(16, 2, Cell::Full).unwrap();
        grid.set_cell(10, 3, Cell::Full).unwrap();

        let mut engine = LineClearEngine::new();
        assert_eq!(engine.scan_and_mark(&mut grid).unwrap(), &[17, 19]);
        assert_eq!(engine.remove_marked(&mut grid).unwrap(), 2);

        // 18 had one removed row beneath it, 16 and 10 had two.
        assert_eq!(grid.cell_at(19, 1), Ok(Cell::Full));
        assert_eq!(grid.cell_at(18, 2), Ok(Cell::Full));
        assert_eq!(grid.cell_at(12, 3), Ok(Cell::Full));
        assert_eq!(grid.count(Cell::Full), 3);
        assert_eq!(grid.count(Cell::Fading), 0);
    }

    #[test]
    fn test_adjacent_rows_cleared_in_one_pass() {
        let mut grid = grid();
        for row in 16..20 {
            grid.fill_row(row, Cell::Full).unwrap();
        }
        grid.set_cell(15, 4, Cell::Full).unwrap();

        let mut engine = LineClearEngine::new();
        assert_eq!(engine.scan_and_mark(&mut grid).unwrap(), &[16, 17, 18, 19]);
        assert_eq!(engine.remove_marked(&mut grid).unwrap(), 4);
        assert_eq!(grid.cell_at(19, 4), Ok(Cell::Full));
        assert_eq!(grid.count(Cell::Full), 1);
    }

    #[test]
    fn test_advance_waits_for_fade() {
        let mut grid = grid();
        grid.fill_row(19, Cell::Full).unwrap();

        let mut engine = LineClearEngine::new();
        engine.scan_and_mark(&mut grid).unwrap();

        for _ in 0..2 {
            assert_eq!(engine.advance(&mut grid, 3).unwrap(), 0);
            assert!(grid.is_row_filled_with(19, Cell::Fading).unwrap());
        }
        assert_eq!(engine.advance(&mut grid, 3).unwrap(), 1);
        assert!(grid.is_row_filled_with(19, Cell::Empty).unwrap());
    }

    #[test]
    fn test_walls_survive_removal() {
        let mut grid = grid();
        grid.fill_row(19, Cell::Full).unwrap();

        let mut engine = LineClearEngine::new();
        engine.scan_and_mark(&mut grid).unwrap();
        engine.remove_marked(&mut grid).unwrap();

        for row in 0..21 {
            assert_eq!(grid.cell_at(row, 0), Ok(Cell::Wall));
            assert_eq!(grid.cell_at(row, 11), Ok(Cell::Wall));
        }
        assert!(grid.is_row_filled_with(20, Cell::Wall).unwrap());
    }
}
