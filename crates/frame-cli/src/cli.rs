//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// framectl - install and activate photo frame display drivers
#[derive(Parser, Debug)]
#[command(name = "framectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "FRAME_DRIVERS_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List installed drivers
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show what a driver installs and configures
    Show {
        /// Driver name
        name: String,

        /// Output the descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install a driver package
    ///
    /// Replaces an installed driver of the same name. The driver is not
    /// activated.
    Install {
        /// Path to the package archive
        archive: PathBuf,
    },

    /// Activate a driver
    ///
    /// Copies the driver's files into place and rewrites the generated
    /// section of the boot configuration.
    Activate {
        /// Driver name
        name: String,

        /// Output the driver options as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the generated section from the boot configuration
    Deactivate,

    /// Delete an installed driver
    Remove {
        /// Driver name
        name: String,
    },
}
