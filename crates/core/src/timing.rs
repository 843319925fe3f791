//! Timing module - tick counters that gate repeated actions
//!
//! Each counter runs `Idle -> Accumulating -> Fired -> Idle`: it grows by one
//! per tick while its gating condition holds, fires once when it reaches its
//! threshold and resets in that same tick. Dropping the condition (releasing
//! the key) resets it immediately.

use crate::config::GameConfig;

/// Observable counter state between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Idle,
    Accumulating,
}

/// One threshold-gated tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    value: u32,
    threshold: u32,
}

impl Counter {
    pub fn new(threshold: u32) -> Self {
        Self {
            value: 0,
            threshold: threshold.max(1),
        }
    }

    /// Add one tick; returns true (and resets) when the threshold is reached
    pub fn advance(&mut self) -> bool {
        self.value += 1;
        if self.value >= self.threshold {
            self.value = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
        if self.value >= self.threshold {
            self.value = self.threshold - 1;
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn state(&self) -> CounterState {
        if self.value == 0 {
            CounterState::Idle
        } else {
            CounterState::Accumulating
        }
    }
}

/// Horizontal direction of a held lateral key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lateral {
    Left,
    Right,
}

impl Lateral {
    pub fn delta(&self) -> isize {
        match self {
            Lateral::Left => -1,
            Lateral::Right => 1,
        }
    }
}

/// Snapshot of the four counter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersSnapshot {
    pub gravity: u32,
    pub lateral: u32,
    pub turn: u32,
    pub fast_fall: u32,
}

/// Actions that fired during one scheduler step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fired {
    pub gravity: bool,
    pub fast_fall: bool,
    pub lateral: Option<Lateral>,
    pub turn: bool,
}

impl Fired {
    /// Whether the piece should take a gravity step this tick
    pub fn falls(&self) -> bool {
        self.gravity || self.fast_fall
    }
}

/// Held-input state plus the four counters it gates
#[derive(Debug, Clone)]
pub struct TickScheduler {
    gravity: Counter,
    lateral: Counter,
    turn: Counter,
    fast_fall: Counter,
    held_lateral: Option<Lateral>,
    held_turn: bool,
    held_fast_fall: bool,
}

impl TickScheduler {
    pub fn new(config: &GameConfig, gravity_threshold: u32) -> Self {
        Self {
            gravity: Counter::new(gravity_threshold),
            lateral: Counter::new(config.lateral_repeat),
            turn: Counter::new(config.turn_repeat),
            fast_fall: Counter::new(config.fast_fall_repeat),
            held_lateral: None,
            held_turn: false,
            held_fast_fall: false,
        }
    }

    /// Advance every counter whose condition holds.
    ///
    /// Gravity is always gated on by the caller (it only steps the scheduler
    /// while a piece is active and the game is playing).
    pub fn advance(&mut self) -> Fired {
        let mut fired = Fired {
            gravity: self.gravity.advance(),
            ..Fired::default()
        };

        if self.held_fast_fall && self.fast_fall.advance() {
            fired.fast_fall = true;
            // A forced fall replaces the pending gravity step.
            self.gravity.reset();
        }

        if let Some(direction) = self.held_lateral {
            if self.lateral.advance() {
                fired.lateral = Some(direction);
            }
        }

        if self.held_turn && self.turn.advance() {
            fired.turn = true;
        }

        fired
    }

    pub fn press_lateral(&mut self, direction: Lateral) {
        self.held_lateral = Some(direction);
        self.lateral.reset();
    }

    pub fn release_lateral(&mut self, direction: Lateral) {
        // Releasing a key that was superseded by the opposite one is a no-op.
        if self.held_lateral == Some(direction) {
            self.held_lateral = None;
            self.lateral.reset();
        }
    }

    pub fn press_turn(&mut self) {
        self.held_turn = true;
        self.turn.reset();
    }

    pub fn release_turn(&mut self) {
        self.held_turn = false;
        self.turn.reset();
    }

    pub fn press_fast_fall(&mut self) {
        self.held_fast_fall = true;
        self.fast_fall.reset();
    }

    pub fn release_fast_fall(&mut self) {
        self.held_fast_fall = false;
        self.fast_fall.reset();
    }

    /// Restart fall timing for a freshly spawned piece
    pub fn on_spawn(&mut self) {
        self.gravity.reset();
        self.fast_fall.reset();
    }

    /// Forget every held input and zero all counters
    pub fn release_all(&mut self) {
        self.held_lateral = None;
        self.held_turn = false;
        self.held_fast_fall = false;
        self.gravity.reset();
        self.lateral.reset();
        self.turn.reset();
        self.fast_fall.reset();
    }

    pub fn set_gravity_threshold(&mut self, threshold: u32) {
        self.gravity.set_threshold(threshold);
    }

    pub fn gravity(&self) -> &Counter {
        &self.gravity
    }

    pub fn lateral(&self) -> &Counter {
        &self.lateral
    }

    pub fn turn(&self) -> &Counter {
        &self.turn
    }

    pub fn fast_fall(&self) -> &Counter {
        &self.fast_fall
    }

    pub fn held_lateral(&self) -> Option<Lateral> {
        self.held_lateral
    }

    pub fn counters(&self) -> CountersSnapshot {
        CountersSnapshot {
            gravity: self.gravity.value(),
            lateral: self.lateral.value(),
            turn: self.turn.value(),
            fast_fall: self.fast_fall.value(),
        }
    }
}
