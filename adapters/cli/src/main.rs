#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs an incremental Game of Life session.

mod config;
mod driver;
mod patterns;
mod script;
mod terminal;

use std::{fs, io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use life_core::{BoundingBox, Position};
use life_rendering::{Presentation, RenderingBackend, Scene};
use life_system_session::Session;
use life_system_speed::SpeedSetting;
use life_world::{query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Layer, RandomConfig},
    driver::Driver,
    script::Script,
    terminal::{HeadlessBackend, TerminalBackend},
};

/// Cells of empty space kept around the seeded cells by the default viewport.
const VIEWPORT_MARGIN: i32 = 8;
/// Generation limit applied to headless runs that configure none.
const DEFAULT_HEADLESS_GENERATIONS: u64 = 100;
/// Frame pacing of the interactive terminal backend.
const TERMINAL_FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "life", about = "Incremental Game of Life in the terminal")]
struct CliArgs {
    /// TOML settings file; `life.toml` is read when present otherwise.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Speed slider value within [0.009, 0.5]; also the seconds per generation.
    #[arg(long)]
    speed: Option<f64>,
    /// Built-in pattern to seed, or `random` for a soup.
    #[arg(long)]
    pattern: Option<String>,
    /// Stop after this many generations.
    #[arg(long)]
    generations: Option<u64>,
    /// Live cell probability of a random soup.
    #[arg(long)]
    density: Option<f64>,
    /// Seed of a random soup.
    #[arg(long)]
    seed: Option<u64>,
    /// Replay session commands from a script file.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Start paused instead of running immediately.
    #[arg(long)]
    paused: bool,
    /// Simulate without pacing and print only the final frame.
    #[arg(long)]
    headless: bool,
    /// Tracing filter directive; overrides `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

impl CliArgs {
    fn flag_layer(&self) -> Layer {
        let random = (self.density.is_some() || self.seed.is_some()).then_some(RandomConfig {
            density: self.density,
            seed: self.seed,
        });
        Layer {
            speed: self.speed,
            pattern: self.pattern.clone(),
            generations: self.generations,
            random,
            ..Layer::default()
        }
    }
}

/// Entry point for the Life command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log.as_deref());

    let settings = config::load(args.config.as_deref(), args.flag_layer())
        .context("failed to load settings")?;
    let speed = SpeedSetting::new(settings.speed).context("invalid speed setting")?;
    let script = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script '{}'", path.display()))?;
            Script::parse(&source)
                .with_context(|| format!("failed to parse script '{}'", path.display()))?
        }
        None => Script::default(),
    };

    let mut session = Session::new(speed);
    let mut scene = Scene::new();
    let seeded = session
        .load(settings.seed.cells())
        .context("failed to seed the initial cells")?;
    scene.apply_events(&seeded);
    info!(
        population = query::population(session.world()),
        speed = %speed.label(),
        "session loaded"
    );
    if !args.paused {
        let _ = session.resume();
    }

    let viewport = settings
        .viewport
        .unwrap_or_else(|| default_viewport(session.world()));
    let period = session.speed().tick_period();
    let generations = match (settings.generations, args.headless) {
        (None, true) => Some(DEFAULT_HEADLESS_GENERATIONS),
        (limit, _) => limit,
    };

    let mut driver = Driver::new(session, script, generations);
    driver.refresh_status(&mut scene);
    let presentation = Presentation::new("Conway's Game of Life", viewport, scene);
    let update = |dt, scene: &mut Scene| driver.update(dt, scene);

    if args.headless {
        HeadlessBackend::new(io::stdout().lock(), period).run(presentation, update)
    } else {
        TerminalBackend::new(io::stdout().lock(), TERMINAL_FRAME).run(presentation, update)
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn default_viewport(world: &World) -> BoundingBox {
    match query::bounds(world) {
        Some(bounds) => BoundingBox::new(
            bounds.min().offset(-VIEWPORT_MARGIN, -VIEWPORT_MARGIN),
            bounds.max().offset(VIEWPORT_MARGIN, VIEWPORT_MARGIN),
        ),
        None => BoundingBox::new(
            Position::new(-VIEWPORT_MARGIN, -VIEWPORT_MARGIN),
            Position::new(VIEWPORT_MARGIN, VIEWPORT_MARGIN),
        ),
    }
}
