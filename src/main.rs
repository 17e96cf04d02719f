//! Headless fish tank.
//!
//! Spawns a flock, runs it at a fixed 60 Hz step with the camera orbiting
//! the tank, and logs progress. Pass `--verbose` or set
//! `RUST_LOG=fishtank=trace` for per-tick stats.

use clap::Parser;
use fishtank::prelude::*;
use std::error::Error;
use std::path::PathBuf;

/// Fishtank - run a boids flock without a window
#[derive(Parser, Debug)]
#[command(name = "fishtank")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Flock parameters as JSON; defaults are used when omitted
    config: Option<PathBuf>,

    /// Ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Number of agents to keep in the tank
    #[arg(long, default_value_t = 256)]
    agents: usize,

    /// Number of flocks
    #[arg(long, default_value_t = 4)]
    groups: u32,

    /// Radius of the sphere new agents spawn in
    #[arg(long, default_value_t = 25.0)]
    spawn_radius: f32,

    /// Distance of the orbiting camera from the tank centre
    #[arg(long, default_value_t = 40.0)]
    orbit_radius: f32,

    /// Seed for spawn placement
    #[arg(long)]
    seed: Option<u64>,

    /// Enable trace logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "fishtank=trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => FlockConfig::load(path)?,
        None => FlockConfig::default(),
    };

    let mut population_config = PopulationConfig::default()
        .with_target(cli.agents)
        .with_groups(cli.groups)
        .with_spawn_radius(cli.spawn_radius);
    if let Some(seed) = cli.seed {
        population_config = population_config.with_seed(seed);
    }

    let mut sim = Simulation::new(config)?;
    let mut population = PopulationController::new(population_config)?;

    let mut clock = Clock::new();
    clock.set_fixed_delta(Some(1.0 / 60.0));
    let mut orbit = 0.0_f32;

    tracing::info!(ticks = cli.ticks, target = population.config().target, "starting fish tank");
    while sim.ticks() < cli.ticks {
        let Some(delta) = clock.advance() else { continue };

        sim.apply_population(&mut population);
        orbit += delta;
        let camera = Vec3::new(cli.orbit_radius * orbit.sin(), 0.0, cli.orbit_radius * orbit.cos());

        let stats = sim.tick(delta, Some(camera))?;
        if sim.ticks() % 60 == 0 {
            let centroid = sim.centroid().unwrap_or(Vec3::ZERO);
            tracing::info!(
                tick = sim.ticks(),
                agents = stats.agents,
                octree_nodes = stats.octree_nodes,
                steered = stats.steered,
                centroid = %centroid,
                "flock"
            );
        }
    }

    tracing::info!(ticks = sim.ticks(), "done");
    Ok(())
}
