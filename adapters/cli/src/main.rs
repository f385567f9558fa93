#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one decision tick over a scenario file.

mod scenario;
mod tick;

use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_ai_hints::{HintAggregator, HintsConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Build the per-tick decision snapshot for a scenario and report where to stand.
#[derive(Debug, Parser)]
#[command(name = "arena-ai", about, version)]
struct Cli {
    /// Hint aggregation settings; defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scenario describing bounds, actors, hazards and goals.
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Pathfind cell size in world units, overriding the configuration.
    #[arg(short, long, value_name = "UNITS")]
    resolution: Option<f32>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Replace the scenario's actors with a random crowd of this size.
    #[arg(long, value_name = "COUNT")]
    random_actors: Option<usize>,

    /// Seed for the random crowd.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    log_level: String,
}

/// Entry point for the arena AI command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = match &cli.config {
        Some(path) => HintsConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HintsConfig::default(),
    };
    if let Some(resolution) = cli.resolution {
        config.pathfind_resolution = resolution;
    }
    config.validate().context("invalid configuration")?;

    let mut scenario = Scenario::load(&cli.scenario)?;
    if let Some(count) = cli.random_actors {
        scenario.randomize_actors(count, cli.seed)?;
    }

    let mut hints = HintAggregator::new(config);
    let summary = tick::run(&scenario, &mut hints)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
        );
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
