//! Activate and deactivate drivers

use colored::Colorize;
use frame_drivers::{Activator, Settings};

use crate::error::Result;

/// Run the activate command
///
/// Prints the driver's options, which the display stack reads as hints.
pub fn run_activate(settings: &Settings, name: &str, json: bool) -> Result<()> {
    let options = Activator::from_settings(settings).activate(Some(name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!("{} Activated driver '{}'", "OK".green().bold(), name);
    if !options.is_empty() {
        println!("{}", "Options:".bold());
        for (key, value) in options.iter() {
            println!("  {key} = {value}");
        }
    }
    println!("{}", "Reboot to apply the new boot configuration.".yellow());
    Ok(())
}

/// Run the deactivate command
pub fn run_deactivate(settings: &Settings) -> Result<()> {
    Activator::from_settings(settings).activate(None)?;

    println!(
        "{} Removed the generated section from {}",
        "OK".green().bold(),
        settings.boot_config.display()
    );
    Ok(())
}
