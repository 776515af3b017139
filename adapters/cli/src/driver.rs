//! Glue between the session and a rendering backend.

use std::{ops::ControlFlow, time::Duration};

use life_core::LoopState;
use life_rendering::{Scene, StatusLine};
use life_system_session::{Session, SessionError};
use life_world::query;
use tracing::{info, warn};

use crate::script::{Action, Script};

/// Feeds host time and scripted actions into a session, mirroring every
/// resulting event into the scene.
#[derive(Debug)]
pub(crate) struct Driver {
    session: Session,
    script: Script,
    elapsed: Duration,
    resume_at: Duration,
    generation_limit: Option<u64>,
}

impl Driver {
    /// Creates a driver; `generation_limit` stops the run once reached.
    pub(crate) fn new(session: Session, script: Script, generation_limit: Option<u64>) -> Self {
        Self {
            session,
            script,
            elapsed: Duration::ZERO,
            resume_at: Duration::ZERO,
            generation_limit,
        }
    }

    #[cfg(test)]
    fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one host frame.
    pub(crate) fn update(&mut self, dt: Duration, scene: &mut Scene) -> ControlFlow<()> {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.run_due_actions(scene);

        let events = match self.generation_limit {
            Some(limit) => {
                let budget = limit.saturating_sub(query::generation(self.session.world()));
                self.session.tick_up_to(dt, budget)
            }
            None => self.session.tick(dt),
        };
        scene.apply_events(&events);
        self.refresh_status(scene);

        if self.is_finished() {
            info!(
                generation = query::generation(self.session.world()),
                population = query::population(self.session.world()),
                "run finished"
            );
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Writes the current session summary into the scene.
    pub(crate) fn refresh_status(&self, scene: &mut Scene) {
        let world = self.session.world();
        scene.status = Some(StatusLine::new(
            self.session.state(),
            query::generation(world),
            query::population(world),
            self.session.speed().label(),
        ));
    }

    fn run_due_actions(&mut self, scene: &mut Scene) {
        while self.elapsed >= self.resume_at {
            let Some(action) = self.script.next_action() else {
                return;
            };
            if let Err(error) = self.perform(action, scene) {
                warn!(?action, %error, "scripted action rejected");
            }
        }
    }

    fn perform(&mut self, action: Action, scene: &mut Scene) -> Result<(), SessionError> {
        match action {
            Action::Pause => {
                let _ = self.session.pause();
            }
            Action::Resume => {
                let _ = self.session.resume();
            }
            Action::TogglePause => {
                let _ = self.session.toggle_pause();
            }
            Action::Step => self.session.step_once()?,
            Action::Reset => scene.apply_events(&self.session.reset()),
            Action::Toggle(position) => scene.apply_events(&self.session.toggle_cell(position)?),
            Action::Speed(value) => {
                let _ = self.session.set_speed(value)?;
            }
            Action::Wait(duration) => self.resume_at = self.elapsed.saturating_add(duration),
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        let world = self.session.world();
        if let Some(limit) = self.generation_limit {
            if query::generation(world) >= limit {
                return true;
            }
        }
        if !self.script.is_empty() {
            return false;
        }
        query::is_fixed_point(world) || self.session.state() == LoopState::Paused
    }
}

#[cfg(test)]
mod tests {
    use life_core::Position;
    use life_system_speed::SpeedSetting;

    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    fn session_with(cells: &[(i32, i32)]) -> (Session, Scene) {
        session_at_speed(0.1, cells)
    }

    fn session_at_speed(speed: f64, cells: &[(i32, i32)]) -> (Session, Scene) {
        let mut session = Session::new(SpeedSetting::new(speed).expect("valid speed"));
        let mut scene = Scene::new();
        let events = session
            .load(cells.iter().map(|&(x, y)| Position::new(x, y)))
            .expect("fresh sessions are paused");
        scene.apply_events(&events);
        (session, scene)
    }

    fn run(driver: &mut Driver, scene: &mut Scene, max_frames: usize) -> usize {
        for frame in 1..=max_frames {
            if driver.update(PERIOD, scene).is_break() {
                return frame;
            }
        }
        max_frames
    }

    #[test]
    fn running_session_stops_at_generation_limit() {
        let (mut session, mut scene) = session_with(&[(0, 1), (1, 1), (2, 1)]);
        let _ = session.toggle_pause();
        let mut driver = Driver::new(session, Script::default(), Some(3));

        let frames = run(&mut driver, &mut scene, 10);

        assert_eq!(frames, 3);
        assert_eq!(scene.generation(), 3);
        assert_eq!(scene.population(), 3);
        assert!(scene.is_alive(Position::new(1, 0)), "blinker is vertical after odd generations");
    }

    #[test]
    fn still_life_stops_at_fixed_point() {
        let (mut session, mut scene) = session_with(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let _ = session.toggle_pause();
        let mut driver = Driver::new(session, Script::default(), None);

        assert_eq!(run(&mut driver, &mut scene, 10), 1);
        assert!(query::is_fixed_point(driver.session().world()));
    }

    #[test]
    fn paused_session_without_script_stops_immediately() {
        let (session, mut scene) = session_with(&[(0, 1), (1, 1), (2, 1)]);
        let mut driver = Driver::new(session, Script::default(), None);

        assert_eq!(run(&mut driver, &mut scene, 10), 1);
        assert_eq!(scene.generation(), 0);
        assert_eq!(
            scene.status.as_ref().map(|status| status.state),
            Some(LoopState::Paused)
        );
    }

    #[test]
    fn script_edits_steps_and_waits_in_order() {
        let (session, mut scene) = session_with(&[]);
        let script = Script::parse(
            "toggle 0 1\ntoggle 1 1\ntoggle 2 1\nstep\nwait 300\ntoggle 5 5\nresume\n",
        )
        .expect("valid script");
        let mut driver = Driver::new(session, script, Some(4));

        let frames = run(&mut driver, &mut scene, 20);

        let world = driver.session().world();
        assert_eq!(query::generation(world), 4);
        assert_eq!(frames, 6, "one stepped frame, two idle frames, then three generations");
        assert!(!scene.is_alive(Position::new(5, 5)), "lonely cell died");
    }

    #[test]
    fn generation_limit_holds_when_the_period_is_shorter_than_a_frame() {
        let (mut session, mut scene) = session_at_speed(0.009, &[(0, 1), (1, 1), (2, 1)]);
        let _ = session.resume();
        let mut driver = Driver::new(session, Script::default(), Some(3));

        let frames = run(&mut driver, &mut scene, 10);

        assert_eq!(frames, 1);
        assert_eq!(query::generation(driver.session().world()), 3);
        assert_eq!(scene.generation(), 3);
    }

    #[test]
    fn pause_in_a_paused_session_keeps_it_paused() {
        let (session, mut scene) = session_with(&[(0, 1), (1, 1), (2, 1)]);
        let script = Script::parse("pause\n").expect("valid script");
        let mut driver = Driver::new(session, script, None);

        assert_eq!(run(&mut driver, &mut scene, 10), 1);
        assert_eq!(driver.session().state(), LoopState::Paused);
        assert_eq!(scene.generation(), 0);
    }

    #[test]
    fn resume_in_a_running_session_keeps_it_running() {
        let (mut session, mut scene) = session_with(&[(0, 1), (1, 1), (2, 1)]);
        let _ = session.resume();
        let script = Script::parse("resume\n").expect("valid script");
        let mut driver = Driver::new(session, script, Some(2));

        assert_eq!(run(&mut driver, &mut scene, 10), 2);
        assert_eq!(driver.session().state(), LoopState::Running);
    }

    #[test]
    fn rejected_actions_do_not_stop_the_script() {
        let (mut session, mut scene) = session_with(&[(0, 1), (1, 1), (2, 1)]);
        let _ = session.toggle_pause();
        let script = Script::parse("toggle 9 9\nstep\nspeed 3.0\nreset\n").expect("valid script");
        let mut driver = Driver::new(session, script, None);

        let frames = run(&mut driver, &mut scene, 10);

        assert_eq!(frames, 1);
        assert_eq!(scene.population(), 0, "reset still applied");
        assert_eq!(driver.session().state(), LoopState::Paused);
    }
}
