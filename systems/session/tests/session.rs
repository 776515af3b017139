use std::time::Duration;

use life_core::{BoundingBox, CellState, Event, LoopState, Position};
use life_system_game_loop::LoopError;
use life_system_session::{Session, SessionError};
use life_system_speed::SpeedSetting;
use life_world::query;

const PERIOD: Duration = Duration::from_millis(100);

fn session() -> Session {
    Session::new(SpeedSetting::new(0.1).expect("valid speed"))
}

fn cells(coordinates: &[(i32, i32)]) -> Vec<Position> {
    let mut cells: Vec<Position> = coordinates
        .iter()
        .map(|&(x, y)| Position::new(x, y))
        .collect();
    cells.sort_unstable();
    cells
}

fn generations(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::GenerationAdvanced { .. }))
        .count()
}

#[test]
fn toggled_blinker_oscillates_over_two_single_steps() {
    let mut session = session();
    for position in cells(&[(0, 1), (1, 1), (2, 1)]) {
        let _ = session.toggle_cell(position).expect("edits accepted while paused");
    }

    session.step_once().expect("paused session accepts a step");
    let events = session.tick(PERIOD);
    assert_eq!(generations(&events), 1);
    assert_eq!(session.state(), LoopState::Paused);
    assert_eq!(
        query::live_cells(session.world()),
        cells(&[(1, 0), (1, 1), (1, 2)])
    );

    session.step_once().expect("step again after reverting to paused");
    let _ = session.tick(PERIOD);
    assert_eq!(
        query::live_cells(session.world()),
        cells(&[(0, 1), (1, 1), (2, 1)])
    );
    assert_eq!(query::generation(session.world()), 2);
}

#[test]
fn glider_translates_after_four_generations_while_running() {
    let mut session = session();
    let seed = cells(&[(0, 0), (1, 0), (2, 0), (2, -1), (1, -2)]);
    let _ = session.load(seed.clone()).expect("paused session accepts seeding");
    let start = BoundingBox::covering(&seed).expect("seeded");

    assert_eq!(session.toggle_pause(), LoopState::Running);
    for _ in 0..4 {
        let _ = session.tick(PERIOD);
        assert_eq!(query::population(session.world()), 5);
    }

    let live = query::live_cells(session.world());
    let end = BoundingBox::covering(&live).expect("glider alive");
    assert_eq!(end.min(), start.min().offset(1, 1));
    assert_eq!(end.max(), start.max().offset(1, 1));
    assert_eq!(
        live,
        seed.iter().map(|position| position.offset(1, 1)).collect::<Vec<_>>()
    );
}

#[test]
fn bounds_cover_the_glider_trail() {
    let mut session = session();
    let _ = session
        .load(cells(&[(0, 0), (1, 0), (2, 0), (2, -1), (1, -2)]))
        .expect("paused session accepts seeding");
    let _ = session.toggle_pause();

    let mut previous = query::bounds(session.world()).expect("seeded cells define bounds");
    for _ in 0..12 {
        let _ = session.tick(PERIOD);
        let bounds = query::bounds(session.world()).expect("bounds persist");
        assert!(bounds.encloses(&previous), "bounds must never shrink");
        for cell in query::live_cells(session.world()) {
            assert!(bounds.contains(cell));
        }
        previous = bounds;
    }
}

#[test]
fn step_once_while_running_is_rejected() {
    let mut session = session();
    let _ = session.toggle_pause();

    let error = session.step_once().expect_err("must be rejected");

    assert_eq!(
        error,
        SessionError::Loop(LoopError::InvalidState {
            operation: "step once",
            state: LoopState::Running,
        })
    );
}

#[test]
fn edits_are_rejected_while_running() {
    let mut session = session();
    let _ = session.toggle_pause();

    assert!(session.toggle_cell(Position::new(0, 0)).is_err());
    assert_eq!(
        query::cell_state(session.world(), Position::new(0, 0)),
        CellState::Dead
    );
}

#[test]
fn reset_clears_grid_and_pauses() {
    let mut session = session();
    let _ = session
        .load(cells(&[(0, 0), (1, 0), (2, 0)]))
        .expect("paused session accepts seeding");
    let _ = session.toggle_pause();
    let _ = session.tick(PERIOD);

    let events = session.reset();

    assert_eq!(events, vec![Event::GridCleared]);
    assert_eq!(session.state(), LoopState::Paused);
    assert_eq!(query::population(session.world()), 0);
    assert!(query::dirty_set(session.world()).is_empty());
    assert_eq!(generations(&session.tick(PERIOD * 10)), 0);
}

#[test]
fn out_of_range_speed_propagates_to_the_caller() {
    let mut session = session();

    let error = session.set_speed(0.9).expect_err("out of range");

    assert!(matches!(error, SessionError::Speed(_)));
    assert_eq!(session.speed().label(), "GAME SPEED: 8.3x");
}

#[test]
fn seeding_is_rejected_while_running() {
    let mut session = session();
    let _ = session.resume();

    let error = session
        .load(cells(&[(0, 0), (1, 0), (2, 0)]))
        .expect_err("seeding is an edit");

    assert_eq!(
        error,
        SessionError::Loop(LoopError::InvalidState {
            operation: "seed cells",
            state: LoopState::Running,
        })
    );
    assert_eq!(query::population(session.world()), 0);
}

#[test]
fn generation_cap_drops_surplus_generations_of_a_long_tick() {
    let mut session = session();
    let _ = session
        .load(cells(&[(0, 1), (1, 1), (2, 1)]))
        .expect("paused session accepts seeding");
    let _ = session.resume();

    let events = session.tick_up_to(PERIOD * 10, 3);

    assert_eq!(generations(&events), 3);
    assert_eq!(query::generation(session.world()), 3);
    assert_eq!(generations(&session.tick_up_to(PERIOD, 0)), 0);
}

#[test]
fn scripted_sessions_replay_identically() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::FixedPointReached { .. })));
}

fn replay() -> Vec<Event> {
    let mut session = session();
    let mut log = session
        .load(cells(&[(0, 0), (1, 0), (0, 1)]))
        .expect("paused session accepts seeding");
    log.extend(session.toggle_cell(Position::new(5, 5)).expect("paused"));
    let _ = session.toggle_pause();
    for _ in 0..30 {
        log.extend(session.tick(Duration::from_millis(70)));
    }
    log
}
