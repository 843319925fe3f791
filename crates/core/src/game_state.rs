//! Game state module - the simulation session
//!
//! A [`GameState`] owns the grid, the piece controller, the line clear engine
//! and the tick scheduler. The presentation layer talks to it through four
//! entry points only: [`GameState::handle_input`] / [`GameState::release`]
//! queue input edges, [`GameState::tick`] advances one fixed step, and
//! [`GameState::snapshot`] copies out a read-only view.
//!
//! Within a tick, queued input is applied first; gravity, locking and line
//! clear evaluation follow, and a lock is always followed by a line scan in
//! the same tick.

use arrayvec::ArrayVec;
use log::{debug, trace, warn};

use crate::config::GameConfig;
use crate::controller::{ActivePiece, DropOutcome, HoldOutcome, PieceController, SpawnOutcome};
use crate::error::{ConfigError, GridError};
use crate::grid::Grid;
use crate::line_clear::LineClearEngine;
use crate::pieces::{validate_catalog, PieceBuffer};
use crate::rng::{PieceGenerator, RandomSource, SimpleRng};
use crate::snapshot::{GameFlags, GameSnapshot};
use crate::timing::{CountersSnapshot, Lateral, TickScheduler};
use crate::types::*;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Phase after the tick
    pub phase: Phase,
    pub spawned: Option<PieceKind>,
    pub moved_down: bool,
    pub locked: Option<PieceKind>,
    pub rows_marked: usize,
    pub rows_removed: usize,
    pub blocked_out: bool,
}

/// One game session
#[derive(Debug)]
pub struct GameState {
    config: GameConfig,
    grid: Grid,
    pieces: PieceController,
    line_clear: LineClearEngine,
    scheduler: TickScheduler,
    phase: Phase,
    level: u32,
    lines: u32,
    /// Active piece is resting on the stack
    detection: bool,
    queue: ArrayVec<InputEvent, INPUT_QUEUE_CAPACITY>,
    tick: u64,
}

impl GameState {
    /// Default rules on a `rows` x `cols` grid (walls included)
    pub fn initialize(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        Self::with_config(GameConfig::with_size(rows, cols))
    }

    /// Session seeded from `config.seed`
    pub fn with_config(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = SimpleRng::new(config.seed);
        Self::with_source(config, Box::new(rng))
    }

    /// Session drawing pieces from an injected random source
    pub fn with_source(
        config: GameConfig,
        source: Box<dyn RandomSource + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_catalog()?;

        let grid = Grid::new(config.rows, config.cols)?;
        let scheduler = TickScheduler::new(&config, config.speed_for_level(1));

        Ok(Self {
            grid,
            pieces: PieceController::new(PieceGenerator::new(source)),
            line_clear: LineClearEngine::new(),
            scheduler,
            phase: Phase::Init,
            level: 1,
            lines: 0,
            detection: false,
            queue: ArrayVec::new(),
            tick: 0,
            config,
        })
    }

    /// Full reset back to `Init`; the next tick shows the start screen
    pub fn reset(&mut self) {
        self.grid.reset();
        self.pieces.reset();
        self.line_clear.reset();
        self.scheduler.release_all();
        self.level = 1;
        self.lines = 0;
        self.scheduler
            .set_gravity_threshold(self.config.speed_for_level(self.level));
        self.detection = false;
        self.queue.clear();
        self.enter(Phase::Init);
    }

    /// Queue a key press; applied at the start of the next tick
    pub fn handle_input(&mut self, action: GameAction) {
        self.enqueue(InputEvent::Pressed(action));
    }

    /// Queue a key release; ends auto-repeat for held actions
    pub fn release(&mut self, action: GameAction) {
        self.enqueue(InputEvent::Released(action));
    }

    fn enqueue(&mut self, event: InputEvent) {
        if self.queue.try_push(event).is_err() {
            warn!("input queue full, dropping {:?}", event);
        }
    }

    /// Advance the simulation by exactly one fixed step
    pub fn tick(&mut self) -> Result<TickReport, GridError> {
        self.tick = self.tick.wrapping_add(1);
        let mut report = TickReport::default();

        if self.phase == Phase::Init {
            self.enter(Phase::AwaitingStart);
        }

        let events = std::mem::take(&mut self.queue);
        for event in events {
            self.apply_event(event, &mut report)?;
        }

        self.step(&mut report)?;
        report.phase = self.phase;
        Ok(report)
    }

    fn step(&mut self, report: &mut TickReport) -> Result<(), GridError> {
        // A lock or block-out from input already used up this tick.
        if self.phase != Phase::Playing || report.locked.is_some() || report.blocked_out {
            return Ok(());
        }

        if self.line_clear.is_pending() {
            let removed = self
                .line_clear
                .advance(&mut self.grid, self.config.fade_ticks)?;
            if removed > 0 {
                self.on_rows_removed(removed, report);
            }
            return Ok(());
        }

        if !self.pieces.is_active() {
            let outcome = self.pieces.spawn(&mut self.grid)?;
            self.on_spawn(outcome, report);
            return Ok(());
        }

        let fired = self.scheduler.advance();

        if let Some(direction) = fired.lateral {
            let moved = self.pieces.shift(&mut self.grid, direction.delta())?;
            trace!("lateral repeat {:?}: moved={}", direction, moved);
        }

        if fired.turn {
            let turned = self.pieces.rotate_cw(&mut self.grid)?;
            trace!("turn repeat: turned={}", turned);
        }

        self.refresh_detection();

        if fired.falls() {
            trace!(
                "gravity step (fast_fall={}, speed={})",
                fired.fast_fall,
                self.speed()
            );
            self.gravity_step(report)?;
        }

        Ok(())
    }

    fn apply_event(&mut self, event: InputEvent, report: &mut TickReport) -> Result<(), GridError> {
        match event {
            InputEvent::Pressed(action) => self.press(action, report),
            InputEvent::Released(action) => {
                self.release_held(action);
                Ok(())
            }
        }
    }

    fn press(&mut self, action: GameAction, report: &mut TickReport) -> Result<(), GridError> {
        match (self.phase, action) {
            (Phase::AwaitingStart, GameAction::Start) => self.enter(Phase::Playing),
            (Phase::GameOver, GameAction::Start) => self.reset(),
            (Phase::Playing, GameAction::Pause) => {
                self.scheduler.release_all();
                self.enter(Phase::Paused);
            }
            (Phase::Paused, GameAction::Pause) => {
                self.scheduler.release_all();
                self.enter(Phase::Playing);
            }
            (Phase::Playing, action) => self.play(action, report)?,
            (phase, action) => trace!("ignoring {:?} while {:?}", action, phase),
        }
        Ok(())
    }

    /// Controller operations; only reached while `Playing`
    fn play(&mut self, action: GameAction, report: &mut TickReport) -> Result<(), GridError> {
        match action {
            GameAction::MoveLeft => {
                self.scheduler.press_lateral(Lateral::Left);
                self.pieces.shift(&mut self.grid, -1)?;
                self.refresh_detection();
            }
            GameAction::MoveRight => {
                self.scheduler.press_lateral(Lateral::Right);
                self.pieces.shift(&mut self.grid, 1)?;
                self.refresh_detection();
            }
            GameAction::RotateCw => {
                self.scheduler.press_turn();
                self.pieces.rotate_cw(&mut self.grid)?;
                self.refresh_detection();
            }
            GameAction::SoftDrop => self.scheduler.press_fast_fall(),
            GameAction::HardDrop => {
                if self.pieces.is_active() {
                    let rows = self.pieces.hard_drop(&mut self.grid)?;
                    trace!("hard drop fell {} rows", rows);
                    self.lock_and_scan(report)?;
                }
            }
            GameAction::Hold => match self.pieces.hold_swap(&mut self.grid)? {
                HoldOutcome::Rejected => trace!("hold rejected"),
                HoldOutcome::Stored(outcome) | HoldOutcome::Swapped(outcome) => {
                    self.on_spawn(outcome, report)
                }
            },
            GameAction::Pause | GameAction::Start => {
                trace!("ignoring {:?} while playing", action)
            }
        }
        Ok(())
    }

    fn release_held(&mut self, action: GameAction) {
        match action {
            GameAction::MoveLeft => self.scheduler.release_lateral(Lateral::Left),
            GameAction::MoveRight => self.scheduler.release_lateral(Lateral::Right),
            GameAction::RotateCw => self.scheduler.release_turn(),
            GameAction::SoftDrop => self.scheduler.release_fast_fall(),
            GameAction::HardDrop | GameAction::Hold | GameAction::Pause | GameAction::Start => {}
        }
    }

    fn gravity_step(&mut self, report: &mut TickReport) -> Result<(), GridError> {
        match self.pieces.move_down(&mut self.grid)? {
            DropOutcome::Moved => {
                report.moved_down = true;
                self.refresh_detection();
            }
            DropOutcome::Landed => self.lock_and_scan(report)?,
            DropOutcome::Idle => {}
        }
        Ok(())
    }

    /// `detection` holds while the active piece rests on the stack; the next
    /// gravity step locks it.
    fn refresh_detection(&mut self) {
        self.detection = self.pieces.is_active() && self.pieces.detect_landing(&self.grid);
    }

    fn lock_and_scan(&mut self, report: &mut TickReport) -> Result<(), GridError> {
        report.locked = self.pieces.lock(&mut self.grid)?;
        self.detection = false;
        report.rows_marked = self.line_clear.scan_and_mark(&mut self.grid)?.len();
        Ok(())
    }

    fn on_spawn(&mut self, outcome: SpawnOutcome, report: &mut TickReport) {
        match outcome {
            SpawnOutcome::Spawned(kind) => {
                report.spawned = Some(kind);
                self.refresh_detection();
                self.scheduler.on_spawn();
            }
            SpawnOutcome::BlockedOut(kind) => {
                debug!("game over: {:?} cannot spawn", kind);
                report.blocked_out = true;
                self.scheduler.release_all();
                self.enter(Phase::GameOver);
            }
        }
    }

    fn on_rows_removed(&mut self, removed: usize, report: &mut TickReport) {
        report.rows_removed = removed;
        self.lines = self.lines.saturating_add(removed as u32);

        let level = self.config.level_for_lines(self.lines);
        if level != self.level {
            let speed = self.config.speed_for_level(level);
            debug!("level {} -> {} (speed {})", self.level, level, speed);
            self.level = level;
            self.scheduler.set_gravity_threshold(speed);
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Current gravity threshold in ticks
    pub fn speed(&self) -> u32 {
        self.scheduler.gravity().threshold()
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn current(&self) -> Option<&ActivePiece> {
        self.pieces.current()
    }

    pub fn incoming(&self) -> &PieceBuffer {
        self.pieces.incoming()
    }

    pub fn held(&self) -> &PieceBuffer {
        self.pieces.held()
    }

    pub fn hold_available(&self) -> bool {
        self.pieces.hold_available()
    }

    pub fn line_clear(&self) -> &LineClearEngine {
        &self.line_clear
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.scheduler.counters()
    }

    pub fn flags(&self) -> GameFlags {
        let piece = self.pieces.current();
        GameFlags {
            game_over: self.phase == Phase::GameOver,
            begin_game: matches!(self.phase, Phase::Playing | Phase::Paused | Phase::GameOver),
            begin_play: self.pieces.begin_play(),
            paused: self.phase == Phase::Paused,
            piece_active: piece.is_some(),
            detection: self.detection,
            line_to_delete: self.line_clear.is_pending(),
            level: self.level,
            speed: self.speed(),
            piece_position_x: piece.map_or(0, |p| p.col as i32),
            piece_position_y: piece.map_or(0, |p| p.row as i32),
            current_piece_id: piece.map(|p| p.kind),
            finished_piece_id: self.pieces.finished(),
        }
    }

    /// Copy the renderable state into `out`, reusing its cell buffer
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.rows = self.grid.rows();
        out.cols = self.grid.cols();
        out.cells.clear();
        out.cells.extend_from_slice(self.grid.cells());
        out.incoming = *self.pieces.incoming();
        out.held = *self.pieces.held();
        out.hold_available = self.pieces.hold_available();
        out.phase = self.phase;
        out.flags = self.flags();
        out.lines = self.lines;
        out.counters = self.scheduler.counters();
        out.tick = self.tick;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
