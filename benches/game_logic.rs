use blockfall::core::{GameSnapshot, GameState, Grid, LineClearEngine};
use blockfall::types::{Cell, GameAction};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn playing(seed: u32) -> GameState {
    let mut config = blockfall::core::GameConfig::default();
    config.seed = seed;
    let mut state = GameState::with_config(config).unwrap();
    state.handle_input(GameAction::Start);
    state.tick().unwrap();
    state
}

fn bench_tick(c: &mut Criterion) {
    let mut state = playing(12345);

    c.bench_function("game_tick", |b| {
        b.iter(|| {
            if state.flags().game_over {
                state.handle_input(GameAction::Start);
            }
            black_box(state.tick().unwrap());
        })
    });
}

fn bench_hard_drop_cycle(c: &mut Criterion) {
    let mut state = playing(12345);

    c.bench_function("hard_drop_cycle", |b| {
        b.iter(|| {
            state.handle_input(if state.flags().game_over {
                GameAction::Start
            } else {
                GameAction::HardDrop
            });
            black_box(state.tick().unwrap());
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut grid = Grid::new(21, 12).unwrap();
            for row in 16..20 {
                grid.fill_row(row, Cell::Full).unwrap();
            }
            let mut engine = LineClearEngine::new();
            engine.scan_and_mark(&mut grid).unwrap();
            black_box(engine.remove_marked(&mut grid).unwrap());
        })
    });
}

fn bench_try_move(c: &mut Criterion) {
    let mut state = playing(12345);
    let mut right = true;

    c.bench_function("shift_and_back", |b| {
        b.iter(|| {
            let action = if right { GameAction::MoveRight } else { GameAction::MoveLeft };
            state.handle_input(action);
            state.release(action);
            right = !right;
            black_box(state.tick().unwrap());
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let state = playing(12345);
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            state.snapshot_into(&mut snap);
            black_box(&snap);
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_hard_drop_cycle,
    bench_line_clear,
    bench_try_move,
    bench_snapshot
);
criterion_main!(benches);
