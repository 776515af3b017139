#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Incremental Game of Life engine driven by a dirty set.
//!
//! A generation only evaluates positions that changed in the previous
//! generation together with their Moore neighbours, so the work per tick is
//! bounded by the size of the dirty set rather than the extent of the grid.
//! Two [`GridStore`] buffers are used: the live grid is the authoritative read
//! source, the scratch grid receives the next generation before the changed
//! cells are copied back.

use std::collections::HashSet;

use life_core::{CellChange, CellState, DirtySet, GridStore, Position};

/// Applies the standard Life rule to a single cell.
#[must_use]
pub const fn next_state(current: CellState, live_neighbours: u8) -> CellState {
    match (current, live_neighbours) {
        (CellState::Alive, 2 | 3) | (CellState::Dead, 3) => CellState::Alive,
        _ => CellState::Dead,
    }
}

/// Counts the populated cells among the eight Moore neighbours of `position`.
#[must_use]
pub fn live_neighbours<G>(grid: &G, position: Position) -> u8
where
    G: GridStore + ?Sized,
{
    position
        .neighbours()
        .filter(|neighbour| grid.get(*neighbour).is_alive())
        .count() as u8
}

/// Collects every live position inside `scan_area` into a fresh dirty set.
///
/// This is the only full-area scan the engine ever performs.
pub fn initialize<G, I>(live: &G, scan_area: I) -> DirtySet
where
    G: GridStore + ?Sized,
    I: IntoIterator<Item = Position>,
{
    scan_area
        .into_iter()
        .filter(|position| live.get(*position).is_alive())
        .collect()
}

/// Runs one generation over `dirty` and returns the next dirty set.
///
/// Every dirty position and each of its neighbours is evaluated at most once,
/// reading `live` and writing only changed cells into `scratch`. Changed cells
/// are copied back into `live` before returning. An empty dirty set is a fixed
/// point and leaves both buffers untouched.
pub fn advance<G>(live: &mut G, scratch: &mut G, dirty: &DirtySet) -> DirtySet
where
    G: GridStore + ?Sized,
{
    let mut next = DirtySet::new();
    if dirty.is_empty() {
        return next;
    }

    for position in dirty {
        scratch.set(*position, live.get(*position));
    }

    let mut evaluated: HashSet<Position> = HashSet::with_capacity(dirty.len() * 9);
    for position in dirty {
        let candidates = std::iter::once(*position).chain(position.neighbours());
        for candidate in candidates {
            if !evaluated.insert(candidate) {
                continue;
            }

            let current = live.get(candidate);
            let state = next_state(current, live_neighbours(&*live, candidate));
            if state != current {
                scratch.set(candidate, state);
                let _ = next.insert(candidate);
            }
        }
    }

    for position in &next {
        live.set(*position, scratch.get(*position));
    }

    next
}

/// Owns the live and scratch buffers together with the current dirty set.
///
/// Neither buffer is handed out mutably, which keeps the pair in lockstep.
#[derive(Debug)]
pub struct DirtySetSimulator<G> {
    live: G,
    scratch: G,
    dirty: DirtySet,
}

impl<G> DirtySetSimulator<G>
where
    G: GridStore,
{
    /// Creates a simulator over the provided buffers with an empty dirty set.
    #[must_use]
    pub fn new(live: G, scratch: G) -> Self {
        Self {
            live,
            scratch,
            dirty: DirtySet::new(),
        }
    }

    /// Scans `scan_area` for live cells and merges them into the dirty set.
    ///
    /// Edits queued before the scan stay dirty.
    pub fn initialize<I>(&mut self, scan_area: I) -> &DirtySet
    where
        I: IntoIterator<Item = Position>,
    {
        let scanned = crate::initialize(&self.live, scan_area);
        self.dirty.extend(scanned);
        &self.dirty
    }

    /// Runs one generation, replacing the dirty set with the cells that changed.
    pub fn advance(&mut self) -> &DirtySet {
        self.dirty = crate::advance(&mut self.live, &mut self.scratch, &self.dirty);
        &self.dirty
    }

    /// Current state of every dirty cell, in row-major order.
    ///
    /// Right after [`DirtySetSimulator::advance`] this is the change
    /// notification for the generation.
    #[must_use]
    pub fn changes(&self) -> Vec<CellChange> {
        self.dirty
            .sorted()
            .into_iter()
            .map(|position| CellChange::new(position, self.live.get(position)))
            .collect()
    }

    /// Flips a cell in the live buffer and marks it dirty.
    pub fn toggle(&mut self, position: Position) -> CellState {
        let state = self.live.get(position).toggled();
        self.live.set(position, state);
        let _ = self.dirty.insert(position);
        state
    }

    /// Writes a cell into both buffers without touching the dirty set.
    pub fn seed(&mut self, position: Position, state: CellState) {
        self.live.set(position, state);
        self.scratch.set(position, state);
    }

    /// Clears both buffers and forgets every dirty position.
    pub fn clear(&mut self) {
        self.live.clear_all();
        self.scratch.clear_all();
        self.dirty.clear();
    }

    /// Read-only access to the authoritative buffer.
    #[must_use]
    pub fn live(&self) -> &G {
        &self.live
    }

    /// Positions scheduled for evaluation on the next generation.
    #[must_use]
    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_cells_survive_with_two_or_three_neighbours() {
        for count in 0..=8 {
            let expected = if count == 2 || count == 3 {
                CellState::Alive
            } else {
                CellState::Dead
            };
            assert_eq!(next_state(CellState::Alive, count), expected, "count {count}");
        }
    }

    #[test]
    fn dead_cells_are_born_with_exactly_three_neighbours() {
        for count in 0..=8 {
            let expected = if count == 3 {
                CellState::Alive
            } else {
                CellState::Dead
            };
            assert_eq!(next_state(CellState::Dead, count), expected, "count {count}");
        }
    }
}
