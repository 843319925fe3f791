//! Core game logic module - deterministic, fixed-step and testable
//!
//! This crate holds every rule of the simulation and no I/O at all. A session
//! is advanced one tick at a time by the caller; the same random source and
//! the same input sequence always produce the same game.
//!
//! # Module Structure
//!
//! - [`grid`]: bordered cell matrix with wall-protected accessors
//! - [`pieces`]: 4x4 shape catalogue and clockwise rotation
//! - [`rng`]: injectable random source and the incoming-piece generator
//! - [`controller`]: spawn, movement, rotation, hold and lock of the active piece
//! - [`line_clear`]: two-phase detection and removal of complete rows
//! - [`timing`]: tick counters for gravity, auto-repeat and fast fall
//! - [`game_state`]: the session tying everything to `tick()`
//! - [`snapshot`]: read-only views for the presentation layer
//!
//! # Rules
//!
//! - **Grid**: bottom row and side columns are immutable walls; the top is open
//! - **Spawn**: the incoming piece is promoted into a 4x4 box at the top centre;
//!   if any of its cells are taken the game is over
//! - **Rotation**: clockwise only, in place, rejected when blocked (no kicks)
//! - **Lock**: a gravity step that finds a blocker below any moving cell locks it
//! - **Line clear**: complete rows fade for a fixed window, then collapse
//! - **Hold**: one exchange per lock cycle
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::{GameAction, Phase};
//!
//! let mut game = GameState::initialize(21, 12).unwrap();
//! game.handle_input(GameAction::Start);
//! let report = game.tick().unwrap();
//! assert_eq!(report.phase, Phase::Playing);
//! assert!(report.spawned.is_some());
//!
//! game.handle_input(GameAction::HardDrop);
//! assert!(game.tick().unwrap().locked.is_some());
//! ```
//!
//! # Timing
//!
//! One call to [`GameState::tick`](game_state::GameState::tick) is one step of
//! roughly 16ms. Every duration is counted in ticks, never in wall-clock time.

pub mod config;
pub mod controller;
pub mod error;
pub mod game_state;
pub mod grid;
pub mod line_clear;
pub mod pieces;
pub mod rng;
pub mod snapshot;
pub mod timing;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use config::GameConfig;
pub use controller::{ActivePiece, DropOutcome, HoldOutcome, PieceController, SpawnOutcome};
pub use error::{ConfigError, GridError};
pub use game_state::{GameState, TickReport};
pub use grid::Grid;
pub use line_clear::LineClearEngine;
pub use pieces::{color_for, rotated_shape, shape_for, PieceBuffer, ShapeMatrix};
pub use rng::{PieceGenerator, RandomSource, ScriptedSource, SimpleRng};
pub use snapshot::{GameFlags, GameSnapshot};
pub use timing::{Counter, CountersSnapshot, TickScheduler};
