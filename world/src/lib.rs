#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Life engine.

use std::collections::HashSet;

use life_core::{CellChange, CellState, Command, Event, GridStore, Position};
use life_system_bounds::BoundsTracker;
use life_system_simulation::DirtySetSimulator;
use tracing::{debug, info};

/// Grid store that keeps only the live cells of an unbounded plane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseGrid {
    alive: HashSet<Position>,
}

impl SparseGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.alive.len()
    }

    /// Iterator over the live cells in arbitrary order.
    pub fn live_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.alive.iter().copied()
    }
}

impl GridStore for SparseGrid {
    fn get(&self, position: Position) -> CellState {
        CellState::from(self.alive.contains(&position))
    }

    fn set(&mut self, position: Position, state: CellState) {
        match state {
            CellState::Alive => {
                let _ = self.alive.insert(position);
            }
            CellState::Dead => {
                let _ = self.alive.remove(&position);
            }
        }
    }

    fn clear_all(&mut self) {
        self.alive.clear();
    }
}

/// Represents the authoritative Life world state.
#[derive(Debug)]
pub struct World {
    simulator: DirtySetSimulator<SparseGrid>,
    bounds: BoundsTracker,
    generation: u64,
    fixed_point: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with no live cells and no dirty positions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            simulator: DirtySetSimulator::new(SparseGrid::new(), SparseGrid::new()),
            bounds: BoundsTracker::new(),
            generation: 0,
            fixed_point: true,
        }
    }

    fn include_in_bounds(&mut self, positions: &[Position], out_events: &mut Vec<Event>) {
        if self.bounds.include(positions) {
            if let Some(bounds) = self.bounds.bounds() {
                out_events.push(Event::BoundsExpanded { bounds });
            }
        }
    }

    fn advance_generation(&mut self, out_events: &mut Vec<Event>) {
        if self.simulator.dirty().is_empty() {
            self.announce_fixed_point(out_events);
            return;
        }

        let dirty = self.simulator.advance().len();
        self.generation = self.generation.saturating_add(1);
        debug!(generation = self.generation, dirty, "generation advanced");

        let changes: Vec<CellChange> = self.simulator.changes();
        out_events.push(Event::GenerationAdvanced {
            generation: self.generation,
            changes,
        });

        if self.bounds.observe(self.simulator.dirty()) {
            if let Some(bounds) = self.bounds.bounds() {
                out_events.push(Event::BoundsExpanded { bounds });
            }
        }

        if dirty == 0 {
            self.announce_fixed_point(out_events);
        }
    }

    fn announce_fixed_point(&mut self, out_events: &mut Vec<Event>) {
        if self.fixed_point {
            return;
        }

        self.fixed_point = true;
        info!(generation = self.generation, "grid reached a fixed point");
        out_events.push(Event::FixedPointReached {
            generation: self.generation,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SeedCells { mut cells } => {
            cells.sort_unstable();
            cells.dedup();
            for cell in &cells {
                world.simulator.seed(*cell, CellState::Alive);
            }
            world.include_in_bounds(&cells, out_events);
            out_events.push(Event::CellsSeeded { cells });
        }
        Command::ScanInitialState => {
            let dirty = world.simulator.initialize(world.bounds.scan_area()).len();
            world.fixed_point = dirty == 0;
            debug!(dirty, "initial state scanned");
            out_events.push(Event::InitialStateScanned { dirty });
        }
        Command::ToggleCell { position } => {
            let state = world.simulator.toggle(position);
            world.fixed_point = false;
            world.include_in_bounds(&[position], out_events);
            out_events.push(Event::CellToggled {
                change: CellChange::new(position, state),
            });
        }
        Command::AdvanceGeneration => world.advance_generation(out_events),
        Command::ClearGrid => {
            world.simulator.clear();
            world.generation = 0;
            world.fixed_point = true;
            info!("grid cleared");
            out_events.push(Event::GridCleared);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use life_core::{BoundingBox, CellState, DirtySet, GridStore, Position};

    /// Number of generations run since the last clear.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }

    /// Running box over every position that was ever seeded, edited or dirty.
    #[must_use]
    pub fn bounds(world: &World) -> Option<BoundingBox> {
        world.bounds.bounds()
    }

    /// Positions scheduled for evaluation on the next generation.
    #[must_use]
    pub fn dirty_set(world: &World) -> &DirtySet {
        world.simulator.dirty()
    }

    /// State of a single cell; never-touched positions are dead.
    #[must_use]
    pub fn cell_state(world: &World, position: Position) -> CellState {
        world.simulator.live().get(position)
    }

    /// Live cells in row-major order.
    #[must_use]
    pub fn live_cells(world: &World) -> Vec<Position> {
        let mut cells: Vec<Position> = world.simulator.live().live_cells().collect();
        cells.sort_unstable();
        cells
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(world: &World) -> usize {
        world.simulator.live().population()
    }

    /// Reports whether the grid stopped changing.
    #[must_use]
    pub fn is_fixed_point(world: &World) -> bool {
        world.fixed_point
    }
}
