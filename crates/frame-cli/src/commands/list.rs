//! List installed drivers

use std::path::PathBuf;

use colored::Colorize;
use frame_drivers::{DriverOrigin, Settings};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct DriverEntry {
    name: String,
    origin: &'static str,
    path: PathBuf,
}

fn origin_label(origin: DriverOrigin) -> &'static str {
    match origin {
        DriverOrigin::Builtin => "builtin",
        DriverOrigin::External => "external",
    }
}

/// Run the list command
pub fn run_list(settings: &Settings, json: bool) -> Result<()> {
    let catalog = super::catalog(settings);
    let entries: Vec<DriverEntry> = catalog
        .list()
        .into_iter()
        .map(|(name, path)| {
            let origin = catalog.origin(&name).unwrap_or(DriverOrigin::External);
            DriverEntry {
                name,
                origin: origin_label(origin),
                path,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No drivers installed. Use {} to add one.", "framectl install <archive>".cyan());
        return Ok(());
    }

    println!("{}", "Installed Drivers".bold());
    println!();
    for entry in &entries {
        println!(
            "  {:<20} {:<9} {}",
            entry.name.green(),
            entry.origin,
            entry.path.display().to_string().dimmed()
        );
    }
    println!();
    println!("{} {} drivers", "Total:".dimmed(), entries.len());
    Ok(())
}
