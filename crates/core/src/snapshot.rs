//! Snapshot module - read-only views of a session
//!
//! [`GameFlags`] mirrors the flag set and integer fields; [`GameSnapshot`] is
//! an owned copy of everything the renderer draws, reusable across frames.

use crate::pieces::PieceBuffer;
use crate::timing::CountersSnapshot;
use crate::types::{Cell, Phase, PieceKind};

/// The session's flag set and integer fields, as the presentation layer sees them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameFlags {
    pub game_over: bool,
    /// True once the start screen has been left
    pub begin_game: bool,
    /// True until the first piece of a game has been drawn
    pub begin_play: bool,
    pub paused: bool,
    pub piece_active: bool,
    /// Result of the last landing scan
    pub detection: bool,
    pub line_to_delete: bool,
    pub level: u32,
    /// Gravity threshold in ticks
    pub speed: u32,
    pub piece_position_x: i32,
    pub piece_position_y: i32,
    pub current_piece_id: Option<PieceKind>,
    pub finished_piece_id: Option<PieceKind>,
}

impl Default for GameFlags {
    fn default() -> Self {
        Self {
            game_over: false,
            begin_game: false,
            begin_play: true,
            paused: false,
            piece_active: false,
            detection: false,
            line_to_delete: false,
            level: 1,
            speed: 1,
            piece_position_x: 0,
            piece_position_y: 0,
            current_piece_id: None,
            finished_piece_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major copy of the grid
    pub cells: Vec<Cell>,
    pub incoming: PieceBuffer,
    pub held: PieceBuffer,
    pub hold_available: bool,
    pub phase: Phase,
    pub flags: GameFlags,
    pub lines: u32,
    pub counters: CountersSnapshot,
    pub tick: u64,
}

impl GameSnapshot {
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.cells.get(start..start + self.cols)
    }

    pub fn playable(&self) -> bool {
        self.phase == Phase::Playing
    }
}
