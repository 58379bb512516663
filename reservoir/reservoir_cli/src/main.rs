use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod config;
mod simulated;

use commands::{BenchArgs, BenchUnpooledArgs, CheckConfigArgs};

/// Reservoir Command Line Interface
///
/// Benchmark driver and configuration checker for the Reservoir connection pool.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log verbosity (error, warn, info, debug, trace)
    #[clap(long, global = true, default_value = "warn", env = "RESERVOIR_LOG")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run concurrent tasks that share a connection pool
    Bench(BenchArgs),

    /// Run concurrent tasks that each open their own connection
    #[clap(name = "bench-unpooled")]
    BenchUnpooled(BenchUnpooledArgs),

    /// Validate a workload configuration file
    #[clap(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

fn init_logging(level: &str) -> Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| anyhow!("invalid log level: {}", level))?;

    // Also forwards records from the `log` facade used by the pool crates.
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {}", err))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match &cli.command {
        Commands::Bench(args) => commands::execute_bench(args),
        Commands::BenchUnpooled(args) => commands::execute_bench_unpooled(args),
        Commands::CheckConfig(args) => commands::execute_check_config(args),
    }
}
