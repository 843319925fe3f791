//! Integration tests for the session driven through its public entry points

use blockfall::core::{GameConfig, GameSnapshot, GameState, ScriptedSource};
use blockfall::input::InputHandler;
use blockfall::types::{Cell, GameAction, InputEvent, Phase, PieceKind, FADE_TICKS};

fn scripted(kinds: &[PieceKind]) -> GameState {
    GameState::with_source(
        GameConfig::default(),
        Box::new(ScriptedSource::from_kinds(kinds).unwrap()),
    )
    .unwrap()
}

fn start(state: &mut GameState) {
    state.handle_input(GameAction::Start);
    let report = state.tick().unwrap();
    assert_eq!(report.phase, Phase::Playing);
    assert!(report.spawned.is_some());
}

fn tap(state: &mut GameState, action: GameAction, times: usize) {
    for _ in 0..times {
        state.handle_input(action);
        state.release(action);
    }
}

#[test]
fn test_game_lifecycle() {
    let mut state = GameState::initialize(21, 12).unwrap();
    assert_eq!(state.phase(), Phase::Init);

    assert_eq!(state.tick().unwrap().phase, Phase::AwaitingStart);
    assert!(state.current().is_none());

    start(&mut state);
    assert!(state.flags().begin_game);
    assert!(state.flags().piece_active);
    assert!(!state.flags().game_over);
    assert!(state.incoming().kind().is_some());
}

#[test]
fn test_vertical_i_lands_on_floor() {
    let mut state = scripted(&[PieceKind::I]);
    start(&mut state);

    state.handle_input(GameAction::RotateCw);
    state.release(GameAction::RotateCw);

    let mut locked = None;
    for _ in 0..2000 {
        let report = state.tick().unwrap();
        if report.locked.is_some() {
            locked = report.locked;
            break;
        }
    }
    assert_eq!(locked, Some(PieceKind::I));
    assert!(!state.flags().piece_active);
    assert_eq!(state.flags().finished_piece_id, Some(PieceKind::I));

    // Bottom cell rests on the row above the floor wall.
    for row in 16..=19 {
        assert_eq!(state.grid().cell_at(row, 6), Ok(Cell::Full), "row {row}");
    }
    assert_eq!(state.grid().count(Cell::Full), 4);
    assert_eq!(state.grid().count(Cell::Moving), 0);
}

#[test]
fn test_five_cubes_clear_two_rows() {
    let mut state = scripted(&[PieceKind::Cube]);
    start(&mut state);

    // Spawned cubes cover columns 5-6; shift them across the whole width.
    let placements = [
        (GameAction::MoveLeft, 4),
        (GameAction::MoveLeft, 2),
        (GameAction::MoveLeft, 0),
        (GameAction::MoveRight, 2),
        (GameAction::MoveRight, 4),
    ];

    let mut marked = 0;
    for (i, (action, times)) in placements.into_iter().enumerate() {
        tap(&mut state, action, times);
        state.handle_input(GameAction::HardDrop);
        let report = state.tick().unwrap();
        assert_eq!(report.locked, Some(PieceKind::Cube));
        marked = report.rows_marked;

        if i + 1 < placements.len() {
            assert_eq!(marked, 0);
            assert_eq!(state.tick().unwrap().spawned, Some(PieceKind::Cube));
        }
    }

    assert_eq!(marked, 2);
    assert!(state.flags().line_to_delete);
    assert_eq!(state.grid().count(Cell::Fading), 20);

    // No spawn while rows fade.
    let mut removed = 0;
    for _ in 0..FADE_TICKS {
        let report = state.tick().unwrap();
        assert_eq!(report.spawned, None);
        removed += report.rows_removed;
    }
    assert_eq!(removed, 2);
    assert_eq!(state.lines(), 2);
    assert_eq!(state.grid().count(Cell::Full), 0);
    assert_eq!(state.grid().count(Cell::Fading), 0);

    assert_eq!(state.tick().unwrap().spawned, Some(PieceKind::Cube));
}

#[test]
fn test_stacking_ends_in_block_out() {
    let mut state = scripted(&[PieceKind::Cube]);
    start(&mut state);

    let mut locks = 0;
    for _ in 0..50 {
        state.handle_input(GameAction::HardDrop);
        if state.tick().unwrap().locked.is_some() {
            locks += 1;
        }
        let report = state.tick().unwrap();
        if report.blocked_out {
            break;
        }
    }

    assert_eq!(locks, 9);
    assert_eq!(state.phase(), Phase::GameOver);
    assert!(state.flags().game_over);
    assert!(!state.flags().piece_active);

    // Game over is terminal until Start.
    let before = state.snapshot();
    for _ in 0..100 {
        state.handle_input(GameAction::HardDrop);
        state.tick().unwrap();
    }
    assert_eq!(state.snapshot().cells, before.cells);

    state.handle_input(GameAction::Start);
    state.tick().unwrap();
    state.tick().unwrap();
    assert_eq!(state.phase(), Phase::AwaitingStart);
    start(&mut state);
    assert_eq!(state.grid().count(Cell::Full), 0);
}

#[test]
fn test_pause_freezes_everything_but_the_tick_count() {
    let mut state = GameState::initialize(21, 12).unwrap();
    start(&mut state);
    for _ in 0..45 {
        state.tick().unwrap();
    }

    state.handle_input(GameAction::Pause);
    state.tick().unwrap();
    let frozen = state.snapshot();
    assert_eq!(frozen.phase, Phase::Paused);

    for _ in 0..300 {
        state.handle_input(GameAction::MoveLeft);
        state.tick().unwrap();
    }
    let mut later = state.snapshot();
    assert_eq!(later.tick, frozen.tick + 300);
    later.tick = frozen.tick;
    assert_eq!(later, frozen);

    state.handle_input(GameAction::Pause);
    assert_eq!(state.tick().unwrap().phase, Phase::Playing);
}

#[test]
fn test_same_seed_same_game() {
    fn play(seed: u32) -> GameSnapshot {
        let config = GameConfig {
            seed,
            ..GameConfig::default()
        };
        let mut state = GameState::with_config(config).unwrap();
        start(&mut state);
        for t in 0..3000 {
            match t % 97 {
                0 => state.handle_input(GameAction::HardDrop),
                13 => tap(&mut state, GameAction::MoveLeft, 2),
                41 => tap(&mut state, GameAction::RotateCw, 1),
                60 => tap(&mut state, GameAction::MoveRight, 3),
                _ => {}
            }
            if state.flags().game_over {
                state.handle_input(GameAction::Start);
            }
            state.tick().unwrap();
        }
        state.snapshot()
    }

    assert_eq!(play(7), play(7));
}

#[test]
fn test_hold_swaps_once_per_piece() {
    let mut state = scripted(&[PieceKind::L, PieceKind::J, PieceKind::T]);
    start(&mut state);
    assert_eq!(state.flags().current_piece_id, Some(PieceKind::L));

    state.handle_input(GameAction::Hold);
    state.handle_input(GameAction::Hold);
    state.tick().unwrap();
    assert_eq!(state.held().kind(), Some(PieceKind::L));
    assert_eq!(state.flags().current_piece_id, Some(PieceKind::J));

    state.handle_input(GameAction::HardDrop);
    state.tick().unwrap();
    state.tick().unwrap();
    assert_eq!(state.flags().current_piece_id, Some(PieceKind::T));

    state.handle_input(GameAction::Hold);
    state.tick().unwrap();
    assert_eq!(state.flags().current_piece_id, Some(PieceKind::L));
    assert_eq!(state.held().kind(), Some(PieceKind::T));
}

#[test]
fn test_input_handler_integration() {
    use crossterm::event::KeyCode;

    let mut state = scripted(&[PieceKind::T]);
    start(&mut state);
    let x0 = state.flags().piece_position_x;

    let mut input = InputHandler::new();
    let event = input.handle_key_press(KeyCode::Left).unwrap();
    assert_eq!(event, InputEvent::Pressed(GameAction::MoveLeft));
    if let InputEvent::Pressed(action) = event {
        state.handle_input(action);
    }
    state.tick().unwrap();
    assert_eq!(state.flags().piece_position_x, x0 - 1);

    // Holding repeats on the session's lateral counter.
    for _ in 0..10 {
        state.tick().unwrap();
    }
    assert_eq!(state.flags().piece_position_x, x0 - 2);

    let event = input.handle_key_release(KeyCode::Left).unwrap();
    if let InputEvent::Released(action) = event {
        state.release(action);
    }
    for _ in 0..40 {
        state.tick().unwrap();
    }
    assert_eq!(state.flags().piece_position_x, x0 - 2);
}

#[test]
fn test_key_held_through_pause_moves_after_resume() {
    use crossterm::event::{KeyCode, KeyEvent};
    use std::time::{Duration, Instant};

    fn forward(state: &mut GameState, event: Option<InputEvent>) {
        match event {
            Some(InputEvent::Pressed(action)) => state.handle_input(action),
            Some(InputEvent::Released(action)) => state.release(action),
            None => {}
        }
    }

    let mut state = scripted(&[PieceKind::T]);
    start(&mut state);
    let mut input = InputHandler::new();
    let mut now = Instant::now();
    let left = KeyEvent::from(KeyCode::Left);
    let pause = KeyEvent::from(KeyCode::Char('p'));

    let event = input.handle_key_event_at(left, now);
    forward(&mut state, event);
    input.sync_phase(state.tick().unwrap().phase);

    for _ in 0..2 {
        let event = input.handle_key_event_at(pause, now);
        forward(&mut state, event);
        input.sync_phase(state.tick().unwrap().phase);
    }
    assert_eq!(state.phase(), Phase::Playing);
    let x_resumed = state.flags().piece_position_x;

    // Left is still down: the terminal keeps re-sending it.
    for _ in 0..40 {
        now += Duration::from_millis(30);
        let event = input.handle_key_event_at(left, now);
        forward(&mut state, event);
        for event in input.update_at(now) {
            forward(&mut state, Some(event));
        }
        input.sync_phase(state.tick().unwrap().phase);
    }
    assert!(state.flags().piece_position_x < x_resumed);
}
