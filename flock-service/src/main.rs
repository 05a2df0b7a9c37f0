use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flock_core::{Point, SimulationState, UpdatePolicyKind};
use flock_service::{driver, load_config, run_script, Overrides, SimulationService};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    /// Weighted Boids forces
    Forces,
    /// Prioritized per-agent decisions
    Decision,
}

impl From<Policy> for UpdatePolicyKind {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Forces => UpdatePolicyKind::WeightedForces,
            Policy::Decision => UpdatePolicyKind::PriorityDecision,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Scenario {
    /// Randomly placed default population
    Default,
    /// Three birds and two obstacles near the origin
    Demo,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless 2D flock simulator", long_about = None)]
struct Args {
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Update policy
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,

    /// Initial population for the default scenario
    #[arg(short, long)]
    agents: Option<usize>,

    /// Starting scenario
    #[arg(long, value_enum, default_value = "default")]
    scenario: Scenario,

    /// Extra obstacle as "x,y,radius" (repeatable)
    #[arg(long = "obstacle", value_parser = parse_obstacle)]
    obstacles: Vec<(f64, f64, f64)>,

    /// Activate the attractor at "x,y"
    #[arg(long, value_parser = parse_point)]
    attractor: Option<(f64, f64)>,

    /// Newline-delimited JSON commands applied before the run
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value = "100")]
    steps: u64,

    /// Milliseconds between ticks (0 runs them back to back)
    #[arg(short, long, default_value = "0")]
    interval_ms: u64,

    /// Log a summary every N ticks (0 disables)
    #[arg(long, default_value = "10")]
    log_every: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, value));
    }

    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(numbers)
}

fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok((x, y))
}

fn parse_obstacle(value: &str) -> Result<(f64, f64, f64), String> {
    let [x, y, radius] = parse_numbers::<3>(value)?;
    Ok((x, y, radius))
}

fn build_service(args: &Args) -> Result<SimulationService> {
    let overrides = Overrides {
        seed: args.seed,
        policy: args.policy.map(UpdatePolicyKind::from),
        agents: args.agents,
    };
    let config = load_config(args.config.as_deref(), &overrides)?;
    log::info!(
        "Policy: {:?}, canvas {}x{}",
        config.policy,
        config.width,
        config.height
    );

    let service = SimulationService::new(config).context("Invalid configuration")?;
    match args.scenario {
        Scenario::Default => {
            service.reset().context("Failed to build default population")?;
        }
        Scenario::Demo => {
            let demo = SimulationState::demo();
            service
                .create_simulation(demo.agents, demo.obstacles, None)
                .context("Failed to build demo scenario")?;
        }
    }

    for &(x, y, radius) in &args.obstacles {
        service
            .add_obstacle(Point::new(x, y), radius)
            .with_context(|| format!("Failed to add obstacle at ({}, {})", x, y))?;
    }
    if let Some((x, y)) = args.attractor {
        service
            .set_attractor(Point::new(x, y), true)
            .context("Failed to set attractor")?;
    }

    if let Some(path) = &args.script {
        let file = File::open(path)
            .with_context(|| format!("Failed to open script {}", path.display()))?;
        let results = run_script(&service, BufReader::new(file))
            .with_context(|| format!("Failed to run script {}", path.display()))?;
        let rejected = results.iter().filter(|result| result.is_err()).count();
        log::info!("Script applied {} command(s), {} rejected", results.len(), rejected);
    }

    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Flock simulator starting...");

    let service = Arc::new(build_service(&args).context("Failed to initialize simulation")?);

    let options = driver::RunOptions {
        steps: args.steps,
        interval: (args.interval_ms > 0).then(|| Duration::from_millis(args.interval_ms)),
        log_every: args.log_every,
    };
    let report = driver::run(service.clone(), options)
        .await
        .context("Simulation error")?;

    log::info!(
        "Finished after {} tick(s){}: {} agent(s) left",
        report.ticks_run,
        if report.interrupted { " (interrupted)" } else { "" },
        report.summary.agent_count
    );

    let state = service.get_state().context("Failed to read final state")?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}
