//! Install a driver package

use std::path::Path;

use colored::Colorize;
use frame_drivers::{PackageInstaller, Settings};

use crate::error::{CliError, Result};

/// Run the install command
pub fn run_install(settings: &Settings, archive: &Path) -> Result<()> {
    if !archive.exists() {
        return Err(CliError::user(format!(
            "Package not found: {}",
            archive.display()
        )));
    }

    let descriptor = PackageInstaller::from_settings(settings).install(archive)?;

    println!(
        "{} Installed driver '{}' ({} files, {} config lines)",
        "OK".green().bold(),
        descriptor.driver_name,
        descriptor.install_entries.len(),
        descriptor.config_lines.len()
    );
    println!(
        "Run {} to use it.",
        format!("framectl activate {}", descriptor.driver_name).cyan()
    );
    Ok(())
}
