#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Running bounding box over every position that ever entered a dirty set.
//!
//! The box is advisory: it sizes full-area scans and viewports, and must never
//! be used to discard cells that lie outside of it.

use life_core::{BoundingBox, DirtySet, Position};

/// Grows `bounds` to cover every position in `dirty`.
///
/// Returns `bounds` unchanged when the dirty set is empty.
#[must_use]
pub fn update(bounds: Option<BoundingBox>, dirty: &DirtySet) -> Option<BoundingBox> {
    include(bounds, dirty)
}

fn include<'a, I>(bounds: Option<BoundingBox>, positions: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Position>,
{
    match (bounds, BoundingBox::covering(positions)) {
        (Some(bounds), Some(covering)) => Some(bounds.union(covering)),
        (None, covering) => covering,
        (bounds, None) => bounds,
    }
}

/// Observer that owns the session's bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsTracker {
    bounds: Option<BoundingBox>,
}

impl BoundsTracker {
    /// Creates a tracker that has not observed any position yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { bounds: None }
    }

    /// Current box, or `None` before the first non-empty update.
    #[must_use]
    pub const fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    /// Folds a freshly produced dirty set into the box.
    ///
    /// Returns `true` when the box grew.
    pub fn observe(&mut self, dirty: &DirtySet) -> bool {
        self.grow(update(self.bounds, dirty))
    }

    /// Folds arbitrary positions, such as authored cells, into the box.
    ///
    /// Returns `true` when the box grew.
    pub fn include<'a, I>(&mut self, positions: I) -> bool
    where
        I: IntoIterator<Item = &'a Position>,
    {
        self.grow(include(self.bounds, positions))
    }

    /// Every position covered by the box, in row-major order.
    ///
    /// Empty until the tracker observed at least one position.
    pub fn scan_area(&self) -> impl Iterator<Item = Position> {
        self.bounds.into_iter().flat_map(|bounds| bounds.positions())
    }

    fn grow(&mut self, next: Option<BoundingBox>) -> bool {
        let grew = next != self.bounds;
        self.bounds = next;
        grew
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dirty_set_is_a_no_op() {
        let bounds = Some(BoundingBox::around(Position::new(2, 2)));
        assert_eq!(update(bounds, &DirtySet::new()), bounds);
        assert_eq!(update(None, &DirtySet::new()), None);
    }

    #[test]
    fn scan_area_is_empty_before_first_update() {
        let tracker = BoundsTracker::new();
        assert_eq!(tracker.scan_area().count(), 0);
    }
}
