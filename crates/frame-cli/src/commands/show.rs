//! Show a driver's descriptor

use colored::Colorize;
use frame_drivers::{DriverDescriptor, Settings};

use crate::error::{CliError, Result};

/// Run the show command
pub fn run_show(settings: &Settings, name: &str, json: bool) -> Result<()> {
    let dir = super::catalog(settings)
        .get(name)
        .ok_or_else(|| CliError::user(format!("Driver '{name}' is not installed")))?;
    let descriptor = DriverDescriptor::load(&dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("{} {}", "Driver:".bold(), descriptor.driver_name.green());
    println!("{} {}", "Location:".bold(), dir.display());

    println!();
    println!("{}", "Files:".bold());
    if descriptor.install_entries.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for entry in &descriptor.install_entries {
        println!(
            "  {} -> {}",
            entry.source.display(),
            entry.destination.display().to_string().cyan()
        );
    }

    println!();
    println!("{}", "Boot configuration:".bold());
    if descriptor.config_lines.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for line in &descriptor.config_lines {
        println!("  {line}");
    }

    if !descriptor.options.is_empty() {
        println!();
        println!("{}", "Options:".bold());
        for (key, value) in descriptor.options.iter() {
            println!("  {key} = {value}");
        }
    }
    Ok(())
}
