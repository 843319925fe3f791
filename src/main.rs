//! Terminal Blockfall runner (default binary).
//!
//! Drives one session at a fixed 16ms step: crossterm key events become
//! press/release edges, each tick advances the simulation once, and every
//! frame is rendered from a fresh snapshot.
//!
//! Logs go to the file named by `BLOCKFALL_LOG_PATH` (filtered by `RUST_LOG`,
//! default `info`); without it nothing is logged, since stdout belongs to the
//! game screen.

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use log::{info, warn};

use blockfall::core::{GameConfig, GameSnapshot, GameState};
use blockfall::input::{should_quit, InputHandler};
use blockfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use blockfall::types::{InputEvent, TICK_MS};

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("BLOCKFALL_LOG_PATH") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let config = GameConfig::from_env();
    let game = GameState::with_config(config.clone()).context("invalid game configuration")?;
    info!(
        "starting {}x{} session (seed {}, base speed {})",
        config.rows, config.cols, config.seed, config.base_speed
    );

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, game);

    // Always try to restore terminal state.
    if let Err(err) = term.exit() {
        warn!("failed to restore terminal: {err:#}");
    }
    result
}

fn forward(game: &mut GameState, event: InputEvent) {
    match event {
        InputEvent::Pressed(action) => game.handle_input(action),
        InputEvent::Released(action) => game.release(action),
    }
}

fn run(term: &mut TerminalRenderer, mut game: GameState) -> Result<()> {
    let view = GameView::default();
    let mut input = InputHandler::new();
    let mut snapshot = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();

    loop {
        // Render.
        game.snapshot_into(&mut snapshot);
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snapshot, Viewport::new(w, h), &mut fb);
        term.present(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        info!("quit after {} ticks", game.tick_count());
                        return Ok(());
                    }
                    if let Some(event) = input.handle_key_event(key) {
                        forward(&mut game, event);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            for event in input.update() {
                forward(&mut game, event);
            }

            let report = game.tick().context("simulation step failed")?;
            input.sync_phase(report.phase);
            if report.blocked_out {
                info!(
                    "game over at level {} with {} lines",
                    game.level(),
                    game.lines()
                );
            }
        }
    }
}
