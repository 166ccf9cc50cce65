use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use de_conf::load_conf;
use de_spatial::SpatialIndex;
use tracing::info;

use crate::simulation::Simulation;

mod kinds;
mod simulation;

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_SHA: &str = env!("GIT_SHA");

#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(
        short,
        long,
        value_parser,
        default_value = "conf.yaml",
        help = "Path of a YAML configuration file."
    )]
    conf: PathBuf,
    #[clap(
        short,
        long,
        value_parser,
        help = "Number of simulated ticks, overrides the configuration."
    )]
    ticks: Option<u32>,
    #[clap(long, value_parser, default_value = "logs", help = "Directory of log files.")]
    logs: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_handle = de_log::init(args.logs.as_path()).context("Failed to initialize logging")?;

    info!(
        "Starting Digital Extinction world simulation {{ \"Version\": \"{}\", \"GitSha\": \"{}\" }}",
        CARGO_PKG_VERSION, GIT_SHA
    );
    info!("Logging to {}", log_handle.path().display());

    let mut conf = load_conf(args.conf.as_path())?;
    if let Some(ticks) = args.ticks {
        conf = conf.with_ticks(ticks);
    }

    let mut simulation = Simulation::new(&conf)?;
    let stats = simulation.run(conf.ticks())?;
    info!(
        "Simulation of {} objects finished after {} ticks: {} moves, {} queries, {} hits.",
        simulation.manager().len(),
        stats.ticks,
        stats.moves,
        stats.queries,
        stats.hits
    );
    Ok(())
}
