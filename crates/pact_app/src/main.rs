//! Vengeance Pact
//!
//! Entry point for the engine. With no command it runs the hello pipeline
//! (a printer subscribed to the test message); `pact demo <name>` runs one of
//! the headless dev demos.

mod cli;
mod config;
mod demos;
mod hello;
mod logging;

use anyhow::Result;
use clap::Parser;
use pact_core::PactContext;
use tracing::{debug, info};

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    logging::init(&config.logging, cli.log_level.as_deref())?;

    info!(name = %config.app.name, version = %config.app.version, "Starting");
    debug!("Effective configuration:\n{}", config.to_toml()?);

    match &cli.command {
        None => {
            hello::run(&PactContext::new())?;
        }
        Some(Command::Demo(args)) => demos::run(args, &config)?,
    }

    Ok(())
}
