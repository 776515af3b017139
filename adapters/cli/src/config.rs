//! Layered settings for the command-line host.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `LIFE_*` environment variables, then command-line flags. Each later layer
//! overrides the fields it sets.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use life_core::{BoundingBox, Position};
use life_system_speed::DEFAULT_VALUE;
use serde::Deserialize;
use thiserror::Error;

use crate::patterns::{self, Pattern};

/// File read when `--config` is not supplied; silently skipped when absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "life.toml";
/// Pattern seeded when no layer selects one.
pub(crate) const DEFAULT_PATTERN: &str = "glider";
/// Pattern name that selects a random soup instead of a built-in pattern.
pub(crate) const RANDOM_PATTERN: &str = "random";
/// Fraction of live cells in a random soup unless configured otherwise.
pub(crate) const DEFAULT_DENSITY: f64 = 0.35;

const ENV_SPEED: &str = "LIFE_SPEED";
const ENV_PATTERN: &str = "LIFE_PATTERN";
const ENV_GENERATIONS: &str = "LIFE_GENERATIONS";

const SOUP_COLUMNS: i32 = 48;
const SOUP_ROWS: i32 = 32;

/// Errors raised while assembling the settings.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file '{}'", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for the expected keys.
    #[error("failed to parse configuration file '{}'", path.display())]
    Parse {
        /// File that was requested.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// An environment variable could not be parsed.
    #[error("environment variable {key} has invalid value '{value}'")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
    /// No built-in pattern carries the requested name.
    #[error("unknown pattern '{0}'")]
    UnknownPattern(String),
    /// Random soup density lies outside `[0, 1]`.
    #[error("random density {0} must lie within [0, 1]")]
    InvalidDensity(f64),
}

/// Viewport corners as written in the configuration file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ViewportConfig {
    min: Position,
    max: Position,
}

/// Random soup parameters.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RandomConfig {
    pub(crate) density: Option<f64>,
    pub(crate) seed: Option<u64>,
}

impl RandomConfig {
    fn overlay(self, higher: Self) -> Self {
        Self {
            density: higher.density.or(self.density),
            seed: higher.seed.or(self.seed),
        }
    }
}

/// One partial source of settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Layer {
    pub(crate) speed: Option<f64>,
    pub(crate) pattern: Option<String>,
    pub(crate) generations: Option<u64>,
    pub(crate) viewport: Option<ViewportConfig>,
    pub(crate) cells: Option<Vec<Position>>,
    pub(crate) random: Option<RandomConfig>,
}

impl Layer {
    /// Parses a layer from TOML text; `path` only labels errors.
    pub(crate) fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a layer from a file that must exist.
    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw, path)
    }

    /// Reads a layer from a file, treating a missing file as empty.
    pub(crate) fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw, path),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Builds a layer from `LIFE_*` variables supplied by `lookup`.
    pub(crate) fn from_env<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layer = Self::default();
        if let Some(value) = lookup(ENV_SPEED) {
            layer.speed = Some(parse_env(ENV_SPEED, value)?);
        }
        if let Some(value) = lookup(ENV_PATTERN) {
            layer.pattern = Some(value);
        }
        if let Some(value) = lookup(ENV_GENERATIONS) {
            layer.generations = Some(parse_env(ENV_GENERATIONS, value)?);
        }
        Ok(layer)
    }

    /// Combines two layers; fields set in `higher` win.
    #[must_use]
    pub(crate) fn overlay(self, higher: Self) -> Self {
        let random = match (self.random, higher.random) {
            (Some(lower), Some(upper)) => Some(lower.overlay(upper)),
            (lower, upper) => upper.or(lower),
        };
        Self {
            speed: higher.speed.or(self.speed),
            pattern: higher.pattern.or(self.pattern),
            generations: higher.generations.or(self.generations),
            viewport: higher.viewport.or(self.viewport),
            cells: higher.cells.or(self.cells),
            random,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

/// Where the initial live cells come from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SeedSource {
    /// A built-in pattern anchored at the origin.
    Pattern(&'static Pattern),
    /// Cells listed explicitly in the configuration file.
    Cells(Vec<Position>),
    /// A reproducible random soup.
    Random {
        /// Probability of each cell starting alive.
        density: f64,
        /// Seed of the random generator.
        seed: u64,
    },
}

impl SeedSource {
    /// Materialises the initial live cells.
    #[must_use]
    pub(crate) fn cells(&self) -> Vec<Position> {
        match self {
            Self::Pattern(pattern) => pattern.cells_at(Position::new(0, 0)),
            Self::Cells(cells) => cells.clone(),
            Self::Random { density, seed } => {
                let area = BoundingBox::new(
                    Position::new(0, 0),
                    Position::new(SOUP_COLUMNS - 1, SOUP_ROWS - 1),
                );
                patterns::random_soup(area, *density, *seed)
            }
        }
    }
}

/// Fully resolved settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    /// Speed slider value, validated when the session is built.
    pub(crate) speed: f64,
    /// Initial live cells.
    pub(crate) seed: SeedSource,
    /// Number of generations after which the host stops.
    pub(crate) generations: Option<u64>,
    /// Region shown by the renderer; derived from the seed when absent.
    pub(crate) viewport: Option<BoundingBox>,
}

impl Settings {
    /// Resolves a merged layer against the built-in defaults.
    pub(crate) fn resolve(layer: Layer) -> Result<Self, ConfigError> {
        let random = layer.random.unwrap_or_default();
        let seed = match layer.pattern.as_deref() {
            Some(name) if name.trim().eq_ignore_ascii_case(RANDOM_PATTERN) => {
                random_source(random)?
            }
            Some(name) => SeedSource::Pattern(
                Pattern::find(name).ok_or_else(|| ConfigError::UnknownPattern(name.to_owned()))?,
            ),
            None => match (layer.cells, layer.random) {
                (Some(cells), _) => SeedSource::Cells(cells),
                (None, Some(_)) => random_source(random)?,
                (None, None) => SeedSource::Pattern(
                    Pattern::find(DEFAULT_PATTERN)
                        .ok_or_else(|| ConfigError::UnknownPattern(DEFAULT_PATTERN.to_owned()))?,
                ),
            },
        };

        Ok(Self {
            speed: layer.speed.unwrap_or(DEFAULT_VALUE),
            seed,
            generations: layer.generations,
            viewport: layer
                .viewport
                .map(|viewport| BoundingBox::new(viewport.min, viewport.max)),
        })
    }
}

fn random_source(random: RandomConfig) -> Result<SeedSource, ConfigError> {
    let density = random.density.unwrap_or(DEFAULT_DENSITY);
    if !(0.0..=1.0).contains(&density) {
        return Err(ConfigError::InvalidDensity(density));
    }
    Ok(SeedSource::Random {
        density,
        seed: random.seed.unwrap_or_default(),
    })
}

/// Loads settings from the file, the process environment and the flag layer.
pub(crate) fn load(config: Option<&Path>, flags: Layer) -> Result<Settings, ConfigError> {
    let file = match config {
        Some(path) => Layer::from_file(path)?,
        None => Layer::from_optional_file(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    let env = Layer::from_env(|key| std::env::var(key).ok())?;
    Settings::resolve(file.overlay(env).overlay(flags))
}
