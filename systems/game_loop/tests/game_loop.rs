use std::time::Duration;

use life_core::{Command, Event, LoopState, Position};
use life_system_game_loop::{GameLoop, LoopError};
use life_system_speed::SpeedSetting;

fn tick(game_loop: &mut GameLoop, millis: u64) -> Vec<Command> {
    let mut commands = Vec::new();
    game_loop.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }],
        &mut commands,
    );
    commands
}

fn half_second_loop() -> GameLoop {
    GameLoop::new(SpeedSetting::new(0.5).expect("upper bound is valid"))
}

#[test]
fn starts_paused_and_never_advances_on_its_own() {
    let mut game_loop = half_second_loop();
    assert_eq!(game_loop.state(), LoopState::Paused);

    assert!(tick(&mut game_loop, 5_000).is_empty());
}

#[test]
fn toggle_pause_switches_between_running_and_paused() {
    let mut game_loop = half_second_loop();

    assert_eq!(game_loop.toggle_pause(), LoopState::Running);
    assert_eq!(game_loop.toggle_pause(), LoopState::Paused);
}

#[test]
fn running_emits_one_advance_per_elapsed_period() {
    let mut game_loop = half_second_loop();
    let _ = game_loop.toggle_pause();

    assert!(tick(&mut game_loop, 300).is_empty(), "no advance before a full period");
    assert_eq!(tick(&mut game_loop, 300), vec![Command::AdvanceGeneration]);
    assert_eq!(
        tick(&mut game_loop, 1_000),
        vec![Command::AdvanceGeneration, Command::AdvanceGeneration],
    );
}

#[test]
fn step_once_advances_exactly_once_then_pauses() {
    let mut game_loop = half_second_loop();

    game_loop.step_once().expect("stepping is valid while paused");
    assert_eq!(game_loop.state(), LoopState::SteppingOnce);

    assert!(tick(&mut game_loop, 200).is_empty(), "step waits for the tick interval");
    assert_eq!(
        tick(&mut game_loop, 2_000),
        vec![Command::AdvanceGeneration],
        "a single step never produces more than one generation",
    );
    assert_eq!(game_loop.state(), LoopState::Paused);
    assert!(tick(&mut game_loop, 2_000).is_empty());
}

#[test]
fn step_once_is_rejected_while_running() {
    let mut game_loop = half_second_loop();
    let _ = game_loop.toggle_pause();

    let error = game_loop.step_once().expect_err("stepping while running is invalid");

    assert_eq!(
        error,
        LoopError::InvalidState {
            operation: "step once",
            state: LoopState::Running,
        }
    );
    assert_eq!(game_loop.state(), LoopState::Running);
}

#[test]
fn step_once_is_rejected_while_a_step_is_pending() {
    let mut game_loop = half_second_loop();
    game_loop.step_once().expect("first step is valid");

    assert!(game_loop.step_once().is_err());
}

#[test]
fn toggling_during_a_pending_step_resumes_play() {
    let mut game_loop = half_second_loop();
    game_loop.step_once().expect("valid while paused");

    assert_eq!(game_loop.toggle_pause(), LoopState::Running);
    assert_eq!(tick(&mut game_loop, 1_000).len(), 2);
}

#[test]
fn reset_requests_clear_and_forces_pause() {
    let mut game_loop = half_second_loop();
    let _ = game_loop.toggle_pause();
    let mut commands = Vec::new();

    game_loop.reset(&mut commands);

    assert_eq!(commands, vec![Command::ClearGrid]);
    assert_eq!(game_loop.state(), LoopState::Paused);
    assert!(tick(&mut game_loop, 1_000).is_empty());
}

#[test]
fn edits_are_forwarded_only_while_paused() {
    let mut game_loop = half_second_loop();
    let mut commands = Vec::new();
    let position = Position::new(3, -4);

    game_loop
        .authorize_edit(position, &mut commands)
        .expect("edits are accepted while paused");
    assert_eq!(commands, vec![Command::ToggleCell { position }]);

    let _ = game_loop.toggle_pause();
    commands.clear();
    assert!(game_loop.authorize_edit(position, &mut commands).is_err());
    assert!(commands.is_empty(), "rejected edits must not reach the world");
}

#[test]
fn speed_changes_shorten_the_period() {
    let mut game_loop = half_second_loop();
    let _ = game_loop.toggle_pause();

    let setting = game_loop.set_speed(0.25).expect("in range");
    assert_eq!(setting.tick_period(), Duration::from_millis(250));
    assert_eq!(tick(&mut game_loop, 500).len(), 2);
}

#[test]
fn rejected_speed_keeps_previous_setting() {
    let mut game_loop = half_second_loop();

    assert!(game_loop.set_speed(0.001).is_err());
    assert_eq!(game_loop.speed().tick_period(), Duration::from_millis(500));
}

#[test]
fn pause_and_resume_are_idempotent() {
    let mut game_loop = half_second_loop();

    assert_eq!(game_loop.pause(), LoopState::Paused, "pausing a paused loop keeps it paused");
    assert_eq!(game_loop.resume(), LoopState::Running);
    assert_eq!(game_loop.resume(), LoopState::Running, "resuming a running loop keeps it running");
    assert_eq!(game_loop.pause(), LoopState::Paused);
}

#[test]
fn pause_cancels_a_pending_step() {
    let mut game_loop = half_second_loop();
    game_loop.step_once().expect("valid while paused");

    assert_eq!(game_loop.pause(), LoopState::Paused);
    assert!(tick(&mut game_loop, 1_000).is_empty());
}

#[test]
fn step_after_reset_waits_a_full_period() {
    let mut game_loop = half_second_loop();
    let _ = tick(&mut game_loop, 400);
    let mut commands = Vec::new();
    game_loop.reset(&mut commands);

    game_loop.step_once().expect("valid after reset");

    assert!(tick(&mut game_loop, 200).is_empty(), "time from before the reset is discarded");
    assert_eq!(tick(&mut game_loop, 300), vec![Command::AdvanceGeneration]);
}

#[test]
fn seeding_is_forwarded_only_while_paused() {
    let mut game_loop = half_second_loop();
    let cells = vec![Position::new(0, 0), Position::new(1, 0)];
    let mut commands = Vec::new();

    game_loop
        .authorize_seed(cells.clone(), &mut commands)
        .expect("seeding is accepted while paused");
    assert_eq!(
        commands,
        vec![
            Command::SeedCells {
                cells: cells.clone()
            },
            Command::ScanInitialState,
        ]
    );

    let _ = game_loop.resume();
    commands.clear();
    assert_eq!(
        game_loop.authorize_seed(cells, &mut commands),
        Err(LoopError::InvalidState {
            operation: "seed cells",
            state: LoopState::Running,
        })
    );
    assert!(commands.is_empty());
}
