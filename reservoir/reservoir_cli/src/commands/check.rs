//! Configuration commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::BenchConfig;

/// Arguments for the check-config command
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// TOML workload file to validate
    pub file: PathBuf,
}

/// Implementation of the check-config command
///
/// Prints the effective configuration, defaults filled in, if the file is valid.
pub fn execute_check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = BenchConfig::from_file(&args.file)
        .with_context(|| format!("invalid configuration in {}", args.file.display()))?;

    println!("Configuration OK: {}", args.file.display());
    print!("{}", toml::to_string(&config)?);
    Ok(())
}
