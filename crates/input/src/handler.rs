//! Held-key tracker for terminal environments.
//!
//! The session auto-repeats held actions on its own counters, so this handler
//! only reports press and release edges. Terminals without key-release events
//! re-send presses while a key is down; a key that stops being re-sent for
//! longer than the release timeout is reported as released.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::trace;

use crate::map::action_for_code;
use crate::types::{GameAction, InputEvent, Phase};

/// At most one entry per repeatable action
const MAX_HELD: usize = 4;

// A short timeout keeps a single tap from turning into a sustained "held"
// state on terminals that never report the release.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    action: GameAction,
    last_seen: Instant,
}

/// Tracks which repeatable actions are held down.
#[derive(Debug, Clone)]
pub struct InputHandler {
    held: ArrayVec<HeldKey, MAX_HELD>,
    key_release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            held: ArrayVec::new(),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn is_held(&self, action: GameAction) -> bool {
        self.held.iter().any(|h| h.action == action)
    }

    /// Translate a full crossterm key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<InputEvent> {
        self.handle_key_event_at(key, Instant::now())
    }

    pub fn handle_key_event_at(&mut self, key: KeyEvent, now: Instant) -> Option<InputEvent> {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                crate::map::handle_key_event(key).and_then(|a| self.press_at(a, now))
            }
            KeyEventKind::Release => self.handle_key_release(key.code),
        }
    }

    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<InputEvent> {
        action_for_code(code).and_then(|a| self.press_at(a, Instant::now()))
    }

    /// Returns the press edge, or `None` when the key is already held
    fn press_at(&mut self, action: GameAction, now: Instant) -> Option<InputEvent> {
        if !action.is_repeatable() {
            return Some(InputEvent::Pressed(action));
        }

        if let Some(held) = self.held.iter_mut().find(|h| h.action == action) {
            held.last_seen = now;
            return None;
        }

        // Opposite lateral keys supersede each other.
        let opposite = match action {
            GameAction::MoveLeft => Some(GameAction::MoveRight),
            GameAction::MoveRight => Some(GameAction::MoveLeft),
            _ => None,
        };
        if let Some(opposite) = opposite {
            self.held.retain(|h| h.action != opposite);
        }

        if self.held.try_push(HeldKey { action, last_seen: now }).is_err() {
            trace!("held-key table full, ignoring {:?}", action);
            return None;
        }
        Some(InputEvent::Pressed(action))
    }

    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<InputEvent> {
        let action = action_for_code(code)?;
        let index = self.held.iter().position(|h| h.action == action)?;
        self.held.remove(index);
        Some(InputEvent::Released(action))
    }

    /// Release edges for keys not seen within the timeout.
    pub fn update(&mut self) -> ArrayVec<InputEvent, MAX_HELD> {
        self.update_at(Instant::now())
    }

    pub fn update_at(&mut self, now: Instant) -> ArrayVec<InputEvent, MAX_HELD> {
        let timeout = Duration::from_millis(u64::from(self.key_release_timeout_ms));
        let mut released = ArrayVec::new();

        self.held.retain(|h| {
            let expired = now.saturating_duration_since(h.last_seen) > timeout;
            if expired {
                released.push(InputEvent::Released(h.action));
            }
            !expired
        });

        released
    }

    /// Forget every held key without emitting releases.
    pub fn reset(&mut self) {
        self.held.clear();
    }

    /// Follow the session phase after each tick.
    ///
    /// The session drops all held input outside `Playing`, so tracking stops
    /// there too; a key still down sends a fresh press once play resumes.
    pub fn sync_phase(&mut self, phase: Phase) {
        if phase != Phase::Playing && !self.held.is_empty() {
            trace!("{:?}: forgetting {} held keys", phase, self.held.len());
            self.reset();
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
