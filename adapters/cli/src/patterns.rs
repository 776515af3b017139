//! Built-in seed patterns and random soups.

use life_core::{BoundingBox, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named arrangement of live cells, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pattern {
    /// Lookup name used by flags and configuration files.
    pub(crate) name: &'static str,
    /// Live cells as `(x, y)` offsets with `y` growing downwards.
    pub(crate) cells: &'static [(i32, i32)],
}

impl Pattern {
    /// Finds a pattern by name, ignoring case and treating `_` like `-`.
    #[must_use]
    pub(crate) fn find(name: &str) -> Option<&'static Pattern> {
        let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
        PATTERNS.iter().find(|pattern| pattern.name == wanted)
    }

    /// Live cells of the pattern translated by `origin`.
    #[must_use]
    pub(crate) fn cells_at(&self, origin: Position) -> Vec<Position> {
        self.cells
            .iter()
            .map(|&(x, y)| origin.offset(x, y))
            .collect()
    }
}

/// Every pattern the command line can seed.
#[rustfmt::skip]
pub(crate) const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "pulsar",
        cells: &[
            (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
            (0, 2), (5, 2), (7, 2), (12, 2),
            (0, 3), (5, 3), (7, 3), (12, 3),
            (0, 4), (5, 4), (7, 4), (12, 4),
            (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
            (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
            (0, 8), (5, 8), (7, 8), (12, 8),
            (0, 9), (5, 9), (7, 9), (12, 9),
            (0, 10), (5, 10), (7, 10), (12, 10),
            (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
        ],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
    Pattern {
        name: "gosper-glider-gun",
        cells: &[
            (0, 4), (1, 4), (0, 5), (1, 5),
            (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
            (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
            (16, 6), (17, 5),
            (20, 2), (20, 3), (20, 4), (21, 2), (21, 3), (21, 4), (22, 1),
            (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
];

/// Fills `area` with live cells at the given density, reproducibly for a seed.
///
/// `density` must lie within `[0, 1]`; configuration loading enforces this.
#[must_use]
pub(crate) fn random_soup(area: BoundingBox, density: f64, seed: u64) -> Vec<Position> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    area.positions()
        .filter(|_| rng.gen_bool(density))
        .collect()
}
