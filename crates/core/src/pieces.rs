//! Pieces module - the tetromino catalog
//!
//! Each kind has one spawn shape stored in a 4x4 matrix. Other orientations
//! are computed by rotating the matrix clockwise, so there is no per-rotation
//! table to keep consistent.

use crate::error::ConfigError;
use crate::types::{Color, PieceKind, SHAPE_SIZE};

/// Number of occupied cells in every tetromino
pub const PIECE_CELLS: usize = 4;

/// A 4x4 occupancy matrix, row 0 on top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShapeMatrix([[bool; SHAPE_SIZE]; SHAPE_SIZE]);

impl ShapeMatrix {
    pub const EMPTY: ShapeMatrix = ShapeMatrix([[false; SHAPE_SIZE]; SHAPE_SIZE]);

    /// Build a matrix from `(row, col)` cells
    pub const fn from_cells(cells: [(usize, usize); PIECE_CELLS]) -> Self {
        let mut m = [[false; SHAPE_SIZE]; SHAPE_SIZE];
        let mut i = 0;
        while i < PIECE_CELLS {
            m[cells[i].0][cells[i].1] = true;
            i += 1;
        }
        ShapeMatrix(m)
    }

    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < SHAPE_SIZE && col < SHAPE_SIZE && self.0[row][col]
    }

    /// Occupied `(row, col)` offsets, row-major
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..SHAPE_SIZE)
            .flat_map(|row| (0..SHAPE_SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.0[row][col])
    }

    pub fn count(&self) -> usize {
        self.0.iter().flatten().filter(|&&set| set).count()
    }

    /// Rotate 90° clockwise: `new[r][c] = old[3 - c][r]`
    pub fn rotated_cw(&self) -> Self {
        let mut m = [[false; SHAPE_SIZE]; SHAPE_SIZE];
        for (r, row) in m.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.0[SHAPE_SIZE - 1 - c][r];
            }
        }
        ShapeMatrix(m)
    }

    pub fn rows(&self) -> &[[bool; SHAPE_SIZE]; SHAPE_SIZE] {
        &self.0
    }
}

const CUBE: ShapeMatrix = ShapeMatrix::from_cells([(1, 1), (1, 2), (2, 1), (2, 2)]);
const L: ShapeMatrix = ShapeMatrix::from_cells([(0, 1), (1, 1), (2, 1), (2, 2)]);
const J: ShapeMatrix = ShapeMatrix::from_cells([(0, 2), (1, 2), (2, 2), (2, 1)]);
const I: ShapeMatrix = ShapeMatrix::from_cells([(1, 0), (1, 1), (1, 2), (1, 3)]);
const T: ShapeMatrix = ShapeMatrix::from_cells([(0, 1), (1, 1), (2, 1), (1, 2)]);
const S: ShapeMatrix = ShapeMatrix::from_cells([(1, 1), (1, 2), (2, 2), (2, 3)]);
const Z: ShapeMatrix = ShapeMatrix::from_cells([(2, 1), (2, 2), (1, 2), (1, 3)]);

/// Spawn-orientation shape of a kind
pub fn shape_for(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::Cube => CUBE,
        PieceKind::L => L,
        PieceKind::J => J,
        PieceKind::I => I,
        PieceKind::T => T,
        PieceKind::S => S,
        PieceKind::Z => Z,
    }
}

/// Display color of a kind
pub fn color_for(kind: PieceKind) -> Color {
    match kind {
        PieceKind::Cube => Color::Yellow,
        PieceKind::L => Color::Orange,
        PieceKind::J => Color::Blue,
        PieceKind::I => Color::Cyan,
        PieceKind::T => Color::Purple,
        PieceKind::S => Color::Green,
        PieceKind::Z => Color::Red,
    }
}

/// Shape after `quarter_turns` clockwise rotations from spawn
pub fn rotated_shape(kind: PieceKind, quarter_turns: u8) -> ShapeMatrix {
    (0..quarter_turns % 4).fold(shape_for(kind), |shape, _| shape.rotated_cw())
}

/// Check that every catalog entry is a tetromino in all four orientations
pub fn validate_catalog() -> Result<(), ConfigError> {
    for kind in PieceKind::ALL {
        for turns in 0..4 {
            let cells = rotated_shape(kind, turns).count();
            if cells != PIECE_CELLS {
                return Err(ConfigError::MalformedShape { kind, cells });
            }
        }
    }
    Ok(())
}

/// A 4x4 piece buffer: the incoming preview, the held slot, or the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceBuffer {
    kind: Option<PieceKind>,
    shape: ShapeMatrix,
}

impl PieceBuffer {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_kind(kind: PieceKind) -> Self {
        let mut buffer = Self::empty();
        buffer.load(kind);
        buffer
    }

    /// Clear to empty, then write the spawn shape of `kind`
    pub fn load(&mut self, kind: PieceKind) {
        self.clear();
        self.kind = Some(kind);
        self.shape = shape_for(kind);
    }

    pub fn clear(&mut self) {
        self.kind = None;
        self.shape = ShapeMatrix::EMPTY;
    }

    pub fn take(&mut self) -> Option<PieceKind> {
        let kind = self.kind;
        self.clear();
        kind
    }

    pub fn kind(&self) -> Option<PieceKind> {
        self.kind
    }

    pub fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }
}
