//! Active piece controller - spawn, movement, rotation, hold and lock
//!
//! The active piece lives in the grid as `Moving` cells. The controller keeps
//! its kind, orientation and box position alongside so candidate positions can
//! be computed without rescanning. Every move is all-or-nothing: the full
//! candidate cell set is checked before any cell is written.

use log::debug;

use crate::error::GridError;
use crate::grid::Grid;
use crate::pieces::{PieceBuffer, ShapeMatrix};
use crate::rng::PieceGenerator;
use crate::types::{Cell, PieceKind, SHAPE_SIZE};

/// The piece currently owning the grid's `Moving` cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    /// Row of the 4x4 box's top edge
    pub row: isize,
    /// Column of the 4x4 box's left edge
    pub col: isize,
    /// Clockwise quarter turns applied since spawn
    pub turns: u8,
}

impl ActivePiece {
    fn cells_of(shape: &ShapeMatrix, row: isize, col: isize) -> [(isize, isize); 4] {
        let mut out = [(0, 0); 4];
        for (slot, (r, c)) in out.iter_mut().zip(shape.occupied()) {
            *slot = (row + r as isize, col + c as isize);
        }
        out
    }

    /// Grid coordinates of the four occupied cells
    pub fn cells(&self) -> [(isize, isize); 4] {
        Self::cells_of(&self.shape, self.row, self.col)
    }
}

/// Result of a spawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(PieceKind),
    /// Target cells already occupied; the game is over
    BlockedOut(PieceKind),
}

/// Result of one downward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Moved,
    Landed,
    /// No active piece
    Idle,
}

/// Result of a hold request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Hold already used this lock cycle, or nothing to hold
    Rejected,
    /// Active piece went into the empty hold slot and a fresh piece spawned
    Stored(SpawnOutcome),
    /// Active and held kinds exchanged
    Swapped(SpawnOutcome),
}

/// Owns the incoming -> active -> locked lifecycle of pieces
#[derive(Debug)]
pub struct PieceController {
    generator: PieceGenerator,
    current: Option<ActivePiece>,
    held: PieceBuffer,
    hold_available: bool,
    /// True until the first piece of a game has been drawn
    begin_play: bool,
    finished: Option<PieceKind>,
}

impl PieceController {
    pub fn new(generator: PieceGenerator) -> Self {
        Self {
            generator,
            current: None,
            held: PieceBuffer::empty(),
            hold_available: true,
            begin_play: true,
            finished: None,
        }
    }

    /// Forget every piece; the generator keeps its random stream
    pub fn reset(&mut self) {
        self.generator.clear();
        self.current = None;
        self.held.clear();
        self.hold_available = true;
        self.begin_play = true;
        self.finished = None;
    }

    /// Top-left of the spawn box: first row, centred on the interior
    pub fn spawn_origin(grid: &Grid) -> (isize, isize) {
        (0, ((grid.cols() - SHAPE_SIZE) / 2) as isize)
    }

    /// Promote the incoming piece (drawing one first if this is the first
    /// piece of the game), draw a new incoming piece and place the current one
    pub fn spawn(&mut self, grid: &mut Grid) -> Result<SpawnOutcome, GridError> {
        if self.begin_play {
            self.generator.next();
            self.begin_play = false;
        }

        let kind = match self.generator.incoming().kind() {
            Some(kind) => kind,
            None => self.generator.next(),
        };
        self.generator.next();

        self.place(grid, kind)
    }

    /// Write `kind` at the spawn origin, or report a block-out
    fn place(&mut self, grid: &mut Grid, kind: PieceKind) -> Result<SpawnOutcome, GridError> {
        let (row, col) = Self::spawn_origin(grid);
        let piece = ActivePiece {
            kind,
            shape: crate::pieces::shape_for(kind),
            row,
            col,
            turns: 0,
        };

        if !Self::fits(grid, &piece.cells()) {
            debug!("block-out spawning {:?} at ({}, {})", kind, row, col);
            self.current = None;
            return Ok(SpawnOutcome::BlockedOut(kind));
        }

        Self::write(grid, &piece.cells(), Cell::Moving)?;
        self.current = Some(piece);
        debug!("spawned {:?} at ({}, {})", kind, row, col);
        Ok(SpawnOutcome::Spawned(kind))
    }

    fn fits(grid: &Grid, cells: &[(isize, isize)]) -> bool {
        cells.iter().all(|&(row, col)| !grid.is_blocked(row, col))
    }

    fn write(grid: &mut Grid, cells: &[(isize, isize)], value: Cell) -> Result<(), GridError> {
        for &(row, col) in cells {
            let (row, col) = grid
                .checked_coords(row, col)
                .ok_or(GridError::OutOfBounds {
                    row: row.max(0) as usize,
                    col: col.max(0) as usize,
                    rows: grid.rows(),
                    cols: grid.cols(),
                })?;
            grid.set_cell(row, col, value)?;
        }
        Ok(())
    }

    /// Move the active piece to `candidate` if every target cell is free
    fn commit(&mut self, grid: &mut Grid, candidate: ActivePiece) -> Result<bool, GridError> {
        let Some(current) = self.current else {
            return Ok(false);
        };

        // Own cells are `Moving`, which never blocks, so overlap is allowed.
        if !Self::fits(grid, &candidate.cells()) {
            return Ok(false);
        }

        Self::write(grid, &current.cells(), Cell::Empty)?;
        Self::write(grid, &candidate.cells(), Cell::Moving)?;
        self.current = Some(candidate);
        Ok(true)
    }

    /// Read-only scan: has any `Moving` cell got a `Full`/`Wall` cell below it?
    ///
    /// Every occupied cell is checked, not just the lowest row, because
    /// rotated shapes reach different depths per column.
    pub fn detect_landing(&self, grid: &Grid) -> bool {
        grid.positions_of(Cell::Moving)
            .any(|(row, col)| grid.is_blocked(row as isize + 1, col as isize))
    }

    /// Shift the piece down one row, or report that it has landed
    pub fn move_down(&mut self, grid: &mut Grid) -> Result<DropOutcome, GridError> {
        let Some(current) = self.current else {
            return Ok(DropOutcome::Idle);
        };

        if self.detect_landing(grid) {
            return Ok(DropOutcome::Landed);
        }

        let moved = self.commit(
            grid,
            ActivePiece {
                row: current.row + 1,
                ..current
            },
        )?;
        Ok(if moved {
            DropOutcome::Moved
        } else {
            DropOutcome::Landed
        })
    }

    /// Shift the piece `delta` columns; false when any target cell is taken
    pub fn shift(&mut self, grid: &mut Grid, delta: isize) -> Result<bool, GridError> {
        let Some(current) = self.current else {
            return Ok(false);
        };
        self.commit(
            grid,
            ActivePiece {
                col: current.col + delta,
                ..current
            },
        )
    }

    /// Rotate clockwise in place; false when any target cell is taken
    pub fn rotate_cw(&mut self, grid: &mut Grid) -> Result<bool, GridError> {
        let Some(current) = self.current else {
            return Ok(false);
        };
        self.commit(
            grid,
            ActivePiece {
                shape: current.shape.rotated_cw(),
                turns: (current.turns + 1) % 4,
                ..current
            },
        )
    }

    /// Drop until landed; returns the number of rows fallen
    pub fn hard_drop(&mut self, grid: &mut Grid) -> Result<u32, GridError> {
        let mut rows = 0;
        while self.move_down(grid)? == DropOutcome::Moved {
            rows += 1;
        }
        Ok(rows)
    }

    /// Turn every `Moving` cell into `Full` in place and end the piece
    pub fn lock(&mut self, grid: &mut Grid) -> Result<Option<PieceKind>, GridError> {
        let Some(current) = self.current.take() else {
            return Ok(None);
        };

        let moving: Vec<(usize, usize)> = grid.positions_of(Cell::Moving).collect();
        for (row, col) in moving {
            grid.set_cell(row, col, Cell::Full)?;
        }

        self.hold_available = true;
        self.finished = Some(current.kind);
        debug!(
            "locked {:?} with box at ({}, {})",
            current.kind, current.row, current.col
        );
        Ok(Some(current.kind))
    }

    /// Exchange the active piece with the held one, once per lock cycle
    pub fn hold_swap(&mut self, grid: &mut Grid) -> Result<HoldOutcome, GridError> {
        if !self.hold_available {
            return Ok(HoldOutcome::Rejected);
        }
        let Some(current) = self.current.take() else {
            return Ok(HoldOutcome::Rejected);
        };

        Self::write(grid, &current.cells(), Cell::Empty)?;
        self.hold_available = false;

        let outcome = match self.held.kind() {
            Some(held) => {
                self.held.load(current.kind);
                HoldOutcome::Swapped(self.place(grid, held)?)
            }
            None => {
                self.held.load(current.kind);
                HoldOutcome::Stored(self.spawn(grid)?)
            }
        };
        debug!("hold {:?}: {:?}", current.kind, outcome);
        Ok(outcome)
    }

    pub fn current(&self) -> Option<&ActivePiece> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn incoming(&self) -> &PieceBuffer {
        self.generator.incoming()
    }

    pub fn held(&self) -> &PieceBuffer {
        &self.held
    }

    pub fn hold_available(&self) -> bool {
        self.hold_available
    }

    pub fn begin_play(&self) -> bool {
        self.begin_play
    }

    /// Kind of the most recently locked piece
    pub fn finished(&self) -> Option<PieceKind> {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;

    fn setup(kinds: &[PieceKind]) -> (Grid, PieceController) {
        let grid = Grid::new(21, 12).unwrap();
        let generator = PieceGenerator::new(Box::new(ScriptedSource::from_kinds(kinds).unwrap()));
        (grid, PieceController::new(generator))
    }

    fn moving(grid: &Grid) -> Vec<(usize, usize)> {
        grid.positions_of(Cell::Moving).collect()
    }

    #[test]
    fn test_first_spawn_draws_twice() {
        let (mut grid, mut pc) = setup(&[PieceKind::I, PieceKind::T, PieceKind::Z]);
        assert!(pc.begin_play());

        assert_eq!(pc.spawn(&mut grid).unwrap(), SpawnOutcome::Spawned(PieceKind::I));
        assert!(!pc.begin_play());
        assert_eq!(pc.incoming().kind(), Some(PieceKind::T));

        pc.hard_drop(&mut grid).unwrap();
        pc.lock(&mut grid).unwrap();
        assert_eq!(pc.spawn(&mut grid).unwrap(), SpawnOutcome::Spawned(PieceKind::T));
        assert_eq!(pc.incoming().kind(), Some(PieceKind::Z));
    }

    #[test]
    fn test_spawn_writes_moving_cells_at_origin() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        pc.spawn(&mut grid).unwrap();

        // Box starts at column (12 - 4) / 2 = 4; the I bar sits on box row 1.
        assert_eq!(moving(&grid), vec![(1, 4), (1, 5), (1, 6), (1, 7)]);
    }

    #[test]
    fn test_spawn_into_occupied_cells_blocks_out() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        grid.set_cell(1, 5, Cell::Full).unwrap();

        assert_eq!(
            pc.spawn(&mut grid).unwrap(),
            SpawnOutcome::BlockedOut(PieceKind::I)
        );
        assert!(!pc.is_active());
        assert_eq!(grid.count(Cell::Moving), 0);
    }

    #[test]
    fn test_shift_stops_at_wall() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        pc.spawn(&mut grid).unwrap();

        let mut moves = 0;
        while pc.shift(&mut grid, -1).unwrap() {
            moves += 1;
        }
        assert_eq!(moves, 3);
        assert_eq!(moving(&grid), vec![(1, 1), (1, 2), (1, 3), (1, 4)]);
    }

    #[test]
    fn test_blocked_shift_changes_nothing() {
        let (mut grid, mut pc) = setup(&[PieceKind::T]);
        pc.spawn(&mut grid).unwrap();
        let before_cells = moving(&grid);
        let before_piece = *pc.current().unwrap();

        // T cells: (0,5) (1,5) (2,5) (1,6); the nub would move into (1,7).
        grid.set_cell(1, 7, Cell::Full).unwrap();
        assert!(!pc.shift(&mut grid, 1).unwrap());

        assert_eq!(moving(&grid), before_cells);
        assert_eq!(*pc.current().unwrap(), before_piece);
    }

    #[test]
    fn test_blocked_rotation_changes_nothing() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        pc.spawn(&mut grid).unwrap();
        let before_piece = *pc.current().unwrap();

        // Vertical I would need column 6, rows 0..=3.
        grid.set_cell(3, 6, Cell::Full).unwrap();
        assert!(!pc.rotate_cw(&mut grid).unwrap());

        assert_eq!(*pc.current().unwrap(), before_piece);
        assert_eq!(moving(&grid), vec![(1, 4), (1, 5), (1, 6), (1, 7)]);
    }

    #[test]
    fn test_rotation_commits_new_cells() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        pc.spawn(&mut grid).unwrap();

        assert!(pc.rotate_cw(&mut grid).unwrap());
        assert_eq!(moving(&grid), vec![(0, 6), (1, 6), (2, 6), (3, 6)]);
        assert_eq!(pc.current().unwrap().turns, 1);
    }

    #[test]
    fn test_detect_landing_considers_every_column() {
        let (mut grid, mut pc) = setup(&[PieceKind::T]);
        pc.spawn(&mut grid).unwrap();
        // T cells: (0,5) (1,5) (2,5) (1,6). The nub at (1,6) is landed when (2,6) is full,
        // even though the lowest cell (2,5) is free below.
        assert!(!pc.detect_landing(&grid));
        grid.set_cell(2, 6, Cell::Full).unwrap();
        assert!(pc.detect_landing(&grid));
        assert_eq!(pc.move_down(&mut grid).unwrap(), DropOutcome::Landed);
    }

    #[test]
    fn test_hard_drop_and_lock() {
        let (mut grid, mut pc) = setup(&[PieceKind::Cube]);
        pc.spawn(&mut grid).unwrap();

        // Cube occupies box rows 1..=2; it falls until row 19 is its bottom.
        assert_eq!(pc.hard_drop(&mut grid).unwrap(), 17);
        assert_eq!(pc.lock(&mut grid).unwrap(), Some(PieceKind::Cube));

        assert_eq!(grid.count(Cell::Moving), 0);
        assert_eq!(grid.count(Cell::Full), 4);
        assert_eq!(grid.cell_at(19, 5), Ok(Cell::Full));
        assert_eq!(grid.cell_at(18, 6), Ok(Cell::Full));
        assert!(!pc.is_active());
        assert_eq!(pc.finished(), Some(PieceKind::Cube));
    }

    #[test]
    fn test_hold_once_per_lock() {
        let (mut grid, mut pc) = setup(&[PieceKind::I, PieceKind::T, PieceKind::S, PieceKind::Z]);
        pc.spawn(&mut grid).unwrap();

        // Empty hold: I goes to hold, T is promoted, S becomes incoming.
        assert_eq!(
            pc.hold_swap(&mut grid).unwrap(),
            HoldOutcome::Stored(SpawnOutcome::Spawned(PieceKind::T))
        );
        assert_eq!(pc.held().kind(), Some(PieceKind::I));
        assert_eq!(pc.incoming().kind(), Some(PieceKind::S));
        assert_eq!(grid.count(Cell::Moving), 4);

        // Second hold before a lock is refused.
        assert_eq!(pc.hold_swap(&mut grid).unwrap(), HoldOutcome::Rejected);
        assert_eq!(pc.current().unwrap().kind, PieceKind::T);

        pc.hard_drop(&mut grid).unwrap();
        pc.lock(&mut grid).unwrap();
        pc.spawn(&mut grid).unwrap();
        assert_eq!(pc.current().unwrap().kind, PieceKind::S);

        // After the lock the swap exchanges kinds without drawing.
        assert_eq!(
            pc.hold_swap(&mut grid).unwrap(),
            HoldOutcome::Swapped(SpawnOutcome::Spawned(PieceKind::I))
        );
        assert_eq!(pc.held().kind(), Some(PieceKind::S));
        assert_eq!(pc.incoming().kind(), Some(PieceKind::Z));
    }

    #[test]
    fn test_lock_without_piece_is_noop() {
        let (mut grid, mut pc) = setup(&[PieceKind::I]);
        assert_eq!(pc.lock(&mut grid).unwrap(), None);
        assert_eq!(pc.move_down(&mut grid).unwrap(), DropOutcome::Idle);
        assert!(!pc.shift(&mut grid, 1).unwrap());
    }
}
