//! Text rendering backends for the command-line host.

use std::{
    io::Write,
    ops::ControlFlow,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use life_rendering::{Presentation, RenderingBackend, Scene, TextCanvas};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Backend that redraws the canvas in place once per frame.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
    frame: Duration,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend that sleeps `frame` between updates.
    pub(crate) fn new(out: W, frame: Duration) -> Self {
        Self { out, frame }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>,
    {
        let Presentation {
            title,
            viewport,
            mut scene,
        } = presentation;
        let mut canvas = TextCanvas::new(viewport).context("failed to allocate terminal canvas")?;
        canvas.repaint(&mut scene);
        write!(self.out, "{CLEAR_SCREEN}{title}\n{canvas}")?;
        self.out.flush()?;

        let mut last = Instant::now();
        loop {
            thread::sleep(self.frame);
            let now = Instant::now();
            let flow = update_scene(now.duration_since(last), &mut scene);
            last = now;

            let _ = canvas.redraw(&mut scene);
            write!(self.out, "{CLEAR_SCREEN}{title}\n{canvas}")?;
            self.out.flush()?;

            if flow.is_break() {
                return Ok(());
            }
        }
    }
}

/// Backend that advances a fixed amount of host time per update without
/// sleeping, then prints only the final frame.
#[derive(Debug)]
pub(crate) struct HeadlessBackend<W> {
    out: W,
    frame: Duration,
}

impl<W: Write> HeadlessBackend<W> {
    /// Creates a backend that feeds `frame` of simulated time per update.
    pub(crate) fn new(out: W, frame: Duration) -> Self {
        Self { out, frame }
    }
}

impl<W: Write> RenderingBackend for HeadlessBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>,
    {
        let Presentation {
            title,
            viewport,
            mut scene,
        } = presentation;
        let mut canvas = TextCanvas::new(viewport).context("failed to allocate headless canvas")?;
        canvas.repaint(&mut scene);

        while update_scene(self.frame, &mut scene).is_continue() {
            let _ = canvas.redraw(&mut scene);
        }
        let _ = canvas.redraw(&mut scene);

        write!(self.out, "{title}\n{canvas}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use life_core::{BoundingBox, CellChange, CellState, Event, Position};

    use super::*;

    #[test]
    fn headless_backend_prints_the_final_frame_only() {
        let viewport = BoundingBox::new(Position::new(0, 0), Position::new(2, 0));
        let presentation = Presentation::new("demo", viewport, Scene::new());
        let mut out = Vec::new();
        let mut frames = 0;

        HeadlessBackend::new(&mut out, Duration::from_millis(10))
            .run(presentation, |dt, scene| {
                assert_eq!(dt, Duration::from_millis(10));
                frames += 1;
                scene.apply_events(&[Event::CellToggled {
                    change: CellChange::new(Position::new(frames - 1, 0), CellState::Alive),
                }]);
                if frames == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .expect("headless run succeeds");

        assert_eq!(String::from_utf8(out).expect("utf-8"), "demo\n##.\n");
    }

    #[test]
    fn terminal_backend_redraws_until_break() {
        let viewport = BoundingBox::new(Position::new(0, 0), Position::new(0, 0));
        let presentation = Presentation::new("demo", viewport, Scene::new());
        let mut out = Vec::new();

        TerminalBackend::new(&mut out, Duration::ZERO)
            .run(presentation, |_, _| ControlFlow::Break(()))
            .expect("terminal run succeeds");

        let text = String::from_utf8(out).expect("utf-8");
        assert_eq!(text.matches(CLEAR_SCREEN).count(), 2, "initial and final frame");
        assert!(text.ends_with("demo\n.\n"));
    }
}
