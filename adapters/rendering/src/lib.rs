#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Life adapters.
//!
//! Renderers never query the grid directly. They fold the world's change
//! notifications into a [`Scene`], which remembers which cells need a redraw
//! so that canvases repaint incrementally instead of redrawing every cell.

use std::{collections::HashSet, fmt, ops::ControlFlow, time::Duration};

use anyhow::Result as AnyResult;
use life_core::{BoundingBox, Event, LoopState, Position};
use thiserror::Error;

/// Glyph drawn for a live cell.
pub const ALIVE_GLYPH: char = '#';
/// Glyph drawn for a dead cell.
pub const DEAD_GLYPH: char = '.';
/// Largest number of cells a text canvas may cover.
pub const MAX_CANVAS_CELLS: u64 = 1 << 20;

/// Status information shown beneath the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Loop state of the session.
    pub state: LoopState,
    /// Generation counter of the world.
    pub generation: u64,
    /// Number of live cells.
    pub population: usize,
    /// Speed label derived from the speed setting.
    pub speed_label: String,
}

impl StatusLine {
    /// Creates a new status descriptor.
    #[must_use]
    pub fn new<T>(state: LoopState, generation: u64, population: usize, speed_label: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            state,
            generation,
            population,
            speed_label: speed_label.into(),
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            LoopState::Paused => "PAUSED",
            LoopState::Running => "RUNNING",
            LoopState::SteppingOnce => "STEPPING",
        };
        write!(
            f,
            "{state} | generation {} | population {} | {}",
            self.generation, self.population, self.speed_label
        )
    }
}

/// Renderer-side mirror of the live cells, fed by change notifications.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    alive: HashSet<Position>,
    pending: HashSet<Position>,
    generation: u64,
    /// Optional status shown alongside the grid.
    pub status: Option<StatusLine>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds world events into the scene, queueing affected cells for redraw.
    pub fn apply_events(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CellsSeeded { cells } => {
                    for cell in cells {
                        self.write(*cell, true);
                    }
                }
                Event::CellToggled { change } => {
                    self.write(change.position, change.state.is_alive());
                }
                Event::GenerationAdvanced {
                    generation,
                    changes,
                } => {
                    self.generation = *generation;
                    for change in changes {
                        self.write(change.position, change.state.is_alive());
                    }
                }
                Event::GridCleared => {
                    self.pending.extend(self.alive.drain());
                    self.generation = 0;
                }
                Event::TimeAdvanced { .. }
                | Event::InitialStateScanned { .. }
                | Event::BoundsExpanded { .. }
                | Event::FixedPointReached { .. } => {}
            }
        }
    }

    /// Reports whether the scene shows the cell as alive.
    #[must_use]
    pub fn is_alive(&self, position: Position) -> bool {
        self.alive.contains(&position)
    }

    /// Number of live cells in the scene.
    #[must_use]
    pub fn population(&self) -> usize {
        self.alive.len()
    }

    /// Last generation reported by the world.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drains the cells that changed since the previous call, in row-major order.
    pub fn take_redraw(&mut self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.pending.drain().collect();
        positions.sort_unstable();
        positions
    }

    fn write(&mut self, position: Position, alive: bool) {
        let _ = if alive {
            self.alive.insert(position)
        } else {
            self.alive.remove(&position)
        };
        let _ = self.pending.insert(position);
    }
}

/// Character canvas covering a fixed viewport of the plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextCanvas {
    viewport: BoundingBox,
    rows: Vec<Vec<char>>,
    status: String,
}

impl TextCanvas {
    /// Creates a blank canvas for the viewport.
    ///
    /// Returns an error when the viewport covers more than [`MAX_CANVAS_CELLS`].
    pub fn new(viewport: BoundingBox) -> Result<Self, RenderingError> {
        let (width, height) = (viewport.width(), viewport.height());
        if width.saturating_mul(height) > MAX_CANVAS_CELLS {
            return Err(RenderingError::ViewportTooLarge {
                width,
                height,
                max: MAX_CANVAS_CELLS,
            });
        }

        let row = vec![DEAD_GLYPH; width as usize];
        Ok(Self {
            viewport,
            rows: vec![row; height as usize],
            status: String::new(),
        })
    }

    /// Viewport covered by the canvas.
    #[must_use]
    pub const fn viewport(&self) -> BoundingBox {
        self.viewport
    }

    /// Redraws only the cells queued in the scene, returning how many glyphs changed.
    pub fn redraw(&mut self, scene: &mut Scene) -> usize {
        let mut drawn = 0;
        for position in scene.take_redraw() {
            if self.draw(position, scene.is_alive(position)) {
                drawn += 1;
            }
        }
        self.refresh_status(scene);
        drawn
    }

    /// Repaints every cell of the viewport from the scene.
    pub fn repaint(&mut self, scene: &mut Scene) {
        let _ = scene.take_redraw();
        let viewport = self.viewport;
        for position in viewport.positions() {
            let _ = self.draw(position, scene.is_alive(position));
        }
        self.refresh_status(scene);
    }

    fn draw(&mut self, position: Position, alive: bool) -> bool {
        if !self.viewport.contains(position) {
            return false;
        }

        let min = self.viewport.min();
        let row = position.y().abs_diff(min.y()) as usize;
        let column = position.x().abs_diff(min.x()) as usize;
        let glyph = if alive { ALIVE_GLYPH } else { DEAD_GLYPH };
        let slot = &mut self.rows[row][column];
        let changed = *slot != glyph;
        *slot = glyph;
        changed
    }

    fn refresh_status(&mut self, scene: &Scene) {
        self.status = scene
            .status
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
    }
}

impl fmt::Display for TextCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().collect();
            writeln!(f, "{line}")?;
        }
        if !self.status.is_empty() {
            writeln!(f, "{}", self.status)?;
        }
        Ok(())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title printed before the first frame.
    pub title: String,
    /// Region of the plane shown by the backend.
    pub viewport: BoundingBox,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, viewport: BoundingBox, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            viewport,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Life scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` breaks out of the loop.
    ///
    /// The closure receives the host frame delta and mutates the scene before
    /// it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> ControlFlow<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// The viewport covers too many cells for a text canvas.
    #[error("viewport of {width}x{height} cells exceeds the {max} cell canvas limit")]
    ViewportTooLarge {
        /// Requested number of columns.
        width: u64,
        /// Requested number of rows.
        height: u64,
        /// Largest supported number of cells.
        max: u64,
    },
}
