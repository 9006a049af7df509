//! framectl
//!
//! Command-line front end for installing and activating display drivers.
//! One invocation runs one request, so installs and activations issued
//! through it never interleave within a process.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use frame_drivers::Settings;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let settings = Settings::resolve(cli.config.as_deref())?;
    execute_command(cli.command, &settings)
}

fn execute_command(cmd: Commands, settings: &Settings) -> Result<()> {
    match cmd {
        Commands::List { json } => commands::run_list(settings, json),
        Commands::Show { name, json } => commands::run_show(settings, &name, json),
        Commands::Install { archive } => commands::run_install(settings, &archive),
        Commands::Activate { name, json } => commands::run_activate(settings, &name, json),
        Commands::Deactivate => commands::run_deactivate(settings),
        Commands::Remove { name } => commands::run_remove(settings, &name),
    }
}
