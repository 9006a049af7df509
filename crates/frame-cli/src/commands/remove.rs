//! Remove an installed driver

use colored::Colorize;
use frame_drivers::{PackageInstaller, Settings};

use crate::error::Result;

/// Run the remove command
pub fn run_remove(settings: &Settings, name: &str) -> Result<()> {
    let catalog = super::catalog(settings);
    PackageInstaller::from_settings(settings).remove(&catalog, name)?;

    println!("{} Removed driver '{}'", "OK".green().bold(), name);
    if catalog.get(name).is_some() {
        println!("The built-in driver '{name}' is available again.");
    }
    Ok(())
}
