//! Terminal "game renderer" module.
//!
//! Renders a [`core::GameSnapshot`] into a framebuffer of styled glyphs and
//! flushes it to the terminal through crossterm. The view never touches the
//! session itself, only the snapshot copied out of it.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use game_view::{color_rgb, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
