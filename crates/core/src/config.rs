//! Session configuration.
//!
//! Defaults come from the shared timing constants. `from_env` lets the runner
//! override the common knobs without a config file; unparsable values fall
//! back to the defaults.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::types::{
    BASE_SPEED_TICKS, DEFAULT_COLS, DEFAULT_ROWS, FADE_TICKS, FAST_FALL_REPEAT_TICKS,
    LATERAL_REPEAT_TICKS, LINES_PER_LEVEL, SPEED_STEP_TICKS, TURN_REPEAT_TICKS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Allocated rows, including the bottom wall
    pub rows: usize,
    /// Allocated columns, including both side walls
    pub cols: usize,
    pub seed: u32,
    /// Gravity threshold at level 1
    pub base_speed: u32,
    /// Ticks removed from the gravity threshold per level
    pub speed_step: u32,
    pub lines_per_level: u32,
    pub lateral_repeat: u32,
    pub turn_repeat: u32,
    pub fast_fall_repeat: u32,
    pub fade_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: 1,
            base_speed: BASE_SPEED_TICKS,
            speed_step: SPEED_STEP_TICKS,
            lines_per_level: LINES_PER_LEVEL,
            lateral_repeat: LATERAL_REPEAT_TICKS,
            turn_repeat: TURN_REPEAT_TICKS,
            fast_fall_repeat: FAST_FALL_REPEAT_TICKS,
            fade_ticks: FADE_TICKS,
        }
    }
}

impl GameConfig {
    /// Default configuration with a custom grid size
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            rows: parse_var(&lookup, "BLOCKFALL_ROWS").unwrap_or(defaults.rows),
            cols: parse_var(&lookup, "BLOCKFALL_COLS").unwrap_or(defaults.cols),
            seed: parse_var(&lookup, "BLOCKFALL_SEED").unwrap_or(defaults.seed),
            base_speed: parse_var(&lookup, "BLOCKFALL_SPEED").unwrap_or(defaults.base_speed),
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < Grid::MIN_ROWS || self.cols < Grid::MIN_COLS {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
                min_rows: Grid::MIN_ROWS,
                min_cols: Grid::MIN_COLS,
            });
        }

        let thresholds = [
            ("base_speed", self.base_speed),
            ("lateral_repeat", self.lateral_repeat),
            ("turn_repeat", self.turn_repeat),
            ("fast_fall_repeat", self.fast_fall_repeat),
            ("fade_ticks", self.fade_ticks),
        ];
        if let Some(&(name, _)) = thresholds.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroThreshold { name });
        }

        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }

        Ok(())
    }

    /// Gravity threshold in ticks for `level` (levels start at 1); never below 1
    pub fn speed_for_level(&self, level: u32) -> u32 {
        let reduction = level.saturating_sub(1).saturating_mul(self.speed_step);
        self.base_speed.saturating_sub(reduction).max(1)
    }

    /// Level reached after clearing `lines`
    pub fn level_for_lines(&self, lines: u32) -> u32 {
        1 + lines / self.lines_per_level.max(1)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
