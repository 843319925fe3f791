//! Shared types module - pure data for the simulation and its collaborators
//!
//! Everything here is plain data with no dependencies, so the simulation core,
//! the terminal renderer and the input layer all agree on the same vocabulary.
//!
//! # Grid Dimensions
//!
//! The default grid matches the classic playfield:
//!
//! - **Allocated**: 21 rows x 12 columns
//! - **Interior**: 20 rows x 10 columns
//! - **Walls**: the bottom row and the left/right columns; the top row is open
//!
//! # Timing Constants
//!
//! All thresholds are counted in fixed simulation ticks:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Cadence used by the terminal runner |
//! | `BASE_SPEED_TICKS` | 30 | Gravity threshold at level 1 |
//! | `SPEED_STEP_TICKS` | 3 | Ticks removed from gravity per level |
//! | `LATERAL_REPEAT_TICKS` | 10 | Auto-repeat while left/right is held |
//! | `TURN_REPEAT_TICKS` | 12 | Auto-repeat while rotate is held |
//! | `FAST_FALL_REPEAT_TICKS` | 3 | Forced fall while soft drop is held |
//! | `FADE_TICKS` | 33 | Duration of the row clear animation |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Cell, GameAction, PieceKind};
//!
//! assert_eq!(PieceKind::ALL[PieceKind::T.index()], PieceKind::T);
//! assert!(GameAction::RotateCw.is_repeatable());
//! assert!(Cell::Wall.is_blocking());
//! assert!(!Cell::Moving.is_blocking());
//! ```

/// Default allocated grid height (20 interior rows plus the bottom wall)
pub const DEFAULT_ROWS: usize = 21;

/// Default allocated grid width (10 interior columns plus two walls)
pub const DEFAULT_COLS: usize = 12;

/// Side length of a piece shape buffer
pub const SHAPE_SIZE: usize = 4;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity threshold at level 1, in ticks per row
pub const BASE_SPEED_TICKS: u32 = 30;

/// Ticks removed from the gravity threshold per level gained
pub const SPEED_STEP_TICKS: u32 = 3;

/// Cleared lines needed to gain one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Lateral auto-repeat threshold in ticks
pub const LATERAL_REPEAT_TICKS: u32 = 10;

/// Rotation auto-repeat threshold in ticks
pub const TURN_REPEAT_TICKS: u32 = 12;

/// Fast-fall threshold in ticks while soft drop is held
pub const FAST_FALL_REPEAT_TICKS: u32 = 3;

/// Number of ticks completed rows stay `Fading` before removal
pub const FADE_TICKS: u32 = 33;

/// Maximum number of input events buffered between two ticks
pub const INPUT_QUEUE_CAPACITY: usize = 32;

/// State of a single grid cell
///
/// - **Empty**: free space
/// - **Moving**: part of the active piece, not yet locked
/// - **Full**: a settled block
/// - **Wall**: immutable boundary
/// - **Fading**: a completed row waiting to be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Moving,
    Full,
    Wall,
    Fading,
}

impl Cell {
    /// Whether the active piece is stopped by this cell.
    ///
    /// `Moving` never blocks: only the active piece owns `Moving` cells.
    pub fn is_blocking(&self) -> bool {
        match self {
            Cell::Full | Cell::Wall | Cell::Fading => true,
            Cell::Empty | Cell::Moving => false,
        }
    }
}

/// The seven tetromino kinds
///
/// Each kind has a fixed shape and display color:
/// - **Cube**: Yellow, 2x2 square
/// - **L**: Orange
/// - **J**: Blue (mirror of L)
/// - **I**: Cyan, straight bar
/// - **T**: Purple
/// - **S**: Green
/// - **Z**: Red (mirror of S)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Cube,
    L,
    J,
    I,
    T,
    S,
    Z,
}

impl PieceKind {
    /// All kinds in draw order; a uniform index into this table selects a piece.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::Cube,
        PieceKind::L,
        PieceKind::J,
        PieceKind::I,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Number of distinct kinds
    pub const COUNT: u32 = 7;

    pub fn index(&self) -> usize {
        match self {
            PieceKind::Cube => 0,
            PieceKind::L => 1,
            PieceKind::J => 2,
            PieceKind::I => 3,
            PieceKind::T => 4,
            PieceKind::S => 5,
            PieceKind::Z => 6,
        }
    }
}

/// Display color attached to a piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Yellow,
    Orange,
    Blue,
    Cyan,
    Purple,
    Green,
    Red,
}

/// Requests the presentation layer can push into a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Shift the piece one column left (auto-repeats while held)
    MoveLeft,
    /// Shift the piece one column right (auto-repeats while held)
    MoveRight,
    /// Rotate the piece 90° clockwise (auto-repeats while held)
    RotateCw,
    /// Force the piece down faster while held
    SoftDrop,
    /// Drop the piece to its landing row and lock it
    HardDrop,
    /// Exchange the active piece with the held piece
    Hold,
    /// Toggle between playing and paused
    Pause,
    /// Start a game, or return to the start screen after game over
    Start,
}

impl GameAction {
    /// Actions whose effect repeats for as long as the key stays down
    pub fn is_repeatable(&self) -> bool {
        matches!(
            self,
            GameAction::MoveLeft | GameAction::MoveRight | GameAction::RotateCw | GameAction::SoftDrop
        )
    }
}

/// A buffered input edge, drained at the start of the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Pressed(GameAction),
    Released(GameAction),
}

/// Top-level session state machine
///
/// `Init -> AwaitingStart -> Playing <-> Paused -> GameOver`; only a full
/// reset leaves `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Init,
    AwaitingStart,
    Playing,
    Paused,
    GameOver,
}
