//! Driver activation
//!
//! Activating copies a driver's files to their destinations and rewrites
//! the generated section of the boot configuration. Activating no driver
//! strips the generated section instead.

use std::path::PathBuf;

use crate::boot_config::BootConfig;
use crate::catalog::Catalog;
use crate::descriptor::{DriverDescriptor, OptionMap};
use crate::error::{Error, Result};
use crate::settings::{Settings, destination_allowed};

/// Makes one driver at a time active.
#[derive(Debug, Clone)]
pub struct Activator {
    catalog: Catalog,
    boot_config: BootConfig,
    allowed_destinations: Vec<PathBuf>,
}

impl Activator {
    pub fn new(catalog: Catalog, boot_config: BootConfig) -> Self {
        Self {
            catalog,
            boot_config,
            allowed_destinations: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Catalog::new(&settings.builtin_root, &settings.external_root),
            BootConfig::from_settings(settings),
        )
        .with_allowed_destinations(settings.allowed_destinations.clone())
    }

    /// Restrict install destinations to these prefixes. Empty allows all.
    pub fn with_allowed_destinations(mut self, allowed: Vec<PathBuf>) -> Self {
        self.allowed_destinations = allowed;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn boot_config(&self) -> &BootConfig {
        &self.boot_config
    }

    /// Activate `driver`, or deactivate whatever is active when `None`.
    ///
    /// An unknown name fails before anything is touched. Files are copied in
    /// manifest order; if one copy fails, the ones before it stay in place.
    /// Returns the driver's options as post-activation hints, empty when
    /// deactivating.
    pub fn activate(&self, driver: Option<&str>) -> Result<OptionMap> {
        let Some(name) = driver else {
            tracing::info!("Deactivating driver");
            self.boot_config.apply::<String>(&[])?;
            return Ok(OptionMap::new());
        };

        let driver_dir = self.catalog.get(name).ok_or_else(|| {
            tracing::error!("Tried to activate non-existent driver '{}'", name);
            Error::NotFound(name.to_string())
        })?;
        let descriptor = DriverDescriptor::load(&driver_dir)?;

        self.check_destinations(&descriptor)?;

        for entry in &descriptor.install_entries {
            let from = driver_dir.join(&entry.source);
            tracing::debug!("Copying {} to {}", from.display(), entry.destination.display());
            frame_fs::io::copy_file(&from, &entry.destination).map_err(|source| {
                tracing::error!(
                    "Failed to copy {} to {}: {}",
                    from.display(),
                    entry.destination.display(),
                    source
                );
                Error::Copy {
                    from: from.clone(),
                    to: entry.destination.clone(),
                    source,
                }
            })?;
        }

        self.boot_config.apply(&descriptor.config_lines)?;

        tracing::info!("Activated driver '{}'", descriptor.driver_name);
        Ok(descriptor.options)
    }

    fn check_destinations(&self, descriptor: &DriverDescriptor) -> Result<()> {
        for entry in &descriptor.install_entries {
            if !destination_allowed(&self.allowed_destinations, &entry.destination) {
                tracing::error!(
                    "Driver '{}' wants to install to {}, which is not allowed",
                    descriptor.driver_name,
                    entry.destination.display()
                );
                return Err(Error::DestinationRejected {
                    driver: descriptor.driver_name.clone(),
                    destination: entry.destination.clone(),
                });
            }
        }
        Ok(())
    }
}
