//! voxelwalk - A deterministic voxel world with a walking player
//!
//! Headless driver: generates terrain, steps the player from scripted input and
//! keeps the render set up to date, optionally tracing every tick as JSONL.

mod config;
mod headless;
mod scripted_input;

use anyhow::Result;
use clap::Parser;
use config::{SimConfig, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless voxel world walker", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Ticks to simulate (overrides run.ticks from the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the terrain seed
    #[arg(long)]
    seed: Option<u32>,

    /// JSON file of scripted input steps
    #[arg(long)]
    script: Option<PathBuf>,

    /// Stop as soon as the scripted input runs out
    #[arg(long, requires = "script")]
    exit_when_script_finished: bool,

    /// Write one JSON record per tick to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting voxelwalk v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    if args.write_default_config {
        let config = SimConfig::default();
        config.save_to_path(&args.config)?;
        println!("Wrote default config to {}", args.config.display());
        return Ok(());
    }

    let mut sim = SimConfig::load_from_path(&args.config);
    if let Some(seed) = args.seed {
        sim.world.seed = seed;
    }

    let summary = headless::run(headless::HeadlessConfig {
        sim,
        ticks: args.ticks,
        scripted_input: args.script,
        trace: args.trace,
        exit_when_script_finished: args.exit_when_script_finished,
    })?;

    println!(
        "ticks={} position=({:.3}, {:.3}, {:.3}) rendered={} chunks={}",
        summary.ticks,
        summary.final_position.x,
        summary.final_position.y,
        summary.final_position.z,
        summary.rendered,
        summary.chunks
    );
    Ok(())
}
