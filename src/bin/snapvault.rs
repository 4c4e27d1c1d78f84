//! Snapvault CLI Binary
//!
//! Command-line interface for the snapvault snapshot backend.

use anyhow::Context;
use clap::Parser;
use snapvault::config::VaultConfig;
use snapvault::logging;
use snapvault::repo::{CONFIG_FILE, VAULT_DIR};
use snapvault::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    // Config lives inside the vault; before `initialize` this falls back to
    // defaults.
    let config_path = cli.workspace.join(VAULT_DIR).join(CONFIG_FILE);
    let config = VaultConfig::load(&config_path).context("loading vault configuration")?;
    logging::init(
        &config.logging,
        cli.log_level.as_deref(),
        cli.log_format.as_deref(),
    )
    .context("initializing logging")?;

    let context = CliContext::new(cli.workspace.clone());
    Ok(context.execute(&cli.command)?)
}
