//! Terminal input module (session-facing).
//!
//! Maps `crossterm` key events onto [`crate::types::GameAction`] and turns
//! them into press/release edges for the session. Auto-repeat itself lives in
//! the session's tick counters; this crate only has to report how long a key
//! stays down, including on terminals that never emit key-release events.

pub mod handler;
pub mod map;

pub use blockfall_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, should_quit};
