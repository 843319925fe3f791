//! Error types for the simulation core.
//!
//! Gameplay conditions (blocked moves, completed rows, block-out) are state,
//! not errors. What remains here are programmer errors on grid access and
//! configuration problems that must stop a session from being built.

use thiserror::Error;

use crate::types::PieceKind;

/// Grid access failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("cell ({row}, {col}) is part of the wall and cannot be overwritten")]
    ImmutableWall { row: usize, col: usize },
}

/// Rejected session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must be at least {min_rows}x{min_cols}, got {rows}x{cols}")]
    GridTooSmall {
        rows: usize,
        cols: usize,
        min_rows: usize,
        min_cols: usize,
    },
    #[error("{name} must be at least 1 tick")]
    ZeroThreshold { name: &'static str },
    #[error("lines_per_level must be at least 1")]
    ZeroLinesPerLevel,
    #[error("shape for {kind:?} occupies {cells} cells, expected 4")]
    MalformedShape { kind: PieceKind, cells: usize },
    #[error("scripted source needs at least one value")]
    EmptyScript,
}
