//! Process-wide settings
//!
//! All filesystem locations and the marker line are injected through
//! [`Settings`] so tests can point everything at temporary directories.

use std::path::{Path, PathBuf};

use frame_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Marker line delimiting the generated section of the boot configuration.
pub const DEFAULT_MARKER: &str =
    "### DO NOT EDIT BEYOND THIS COMMENT, IT'S AUTOGENERATED BY PHOTOFRAME ###";

/// Settings file name looked up under the user config directory.
pub const SETTINGS_FILENAME: &str = "config.toml";

/// Driver manager settings.
///
/// # Example TOML
///
/// ```toml
/// builtin_root = "/root/photoframe/display-drivers"
/// external_root = "/root/photoframe_config/display-drivers"
/// boot_config = "/boot/config.txt"
/// unzip_program = "/usr/bin/unzip"
/// allowed_destinations = ["/boot"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Drivers shipped with the system (read-only)
    pub builtin_root: PathBuf,
    /// Drivers installed from packages (writable)
    pub external_root: PathBuf,
    /// Shared boot configuration file
    pub boot_config: PathBuf,
    /// Marker line for the generated section
    pub marker: String,
    /// Extraction tool invoked as `<program> <archive> -d <dest>`
    pub unzip_program: PathBuf,
    /// Parent for temporary extraction directories; system default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,
    /// Prefixes install destinations must live under; empty means unrestricted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_destinations: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            builtin_root: PathBuf::from("/root/photoframe/display-drivers"),
            external_root: PathBuf::from("/root/photoframe_config/display-drivers"),
            boot_config: PathBuf::from("/boot/config.txt"),
            marker: DEFAULT_MARKER.to_string(),
            unzip_program: PathBuf::from("/usr/bin/unzip"),
            temp_root: None,
            allowed_destinations: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML, JSON or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Self = ConfigStore::new().load(path)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load `path` if given, else the per-user settings file if it exists,
    /// else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(candidate) if candidate.is_file() => Self::load(&candidate),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/frame-drivers/config.toml`, if a config dir is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("frame-drivers").join(SETTINGS_FILENAME))
    }

    /// Whether `destination` is acceptable under `allowed_destinations`.
    pub fn destination_allowed(&self, destination: &Path) -> bool {
        destination_allowed(&self.allowed_destinations, destination)
    }
}

/// Whether `destination` lies under one of `allowed` prefixes.
///
/// An empty allow-list accepts everything. Otherwise the destination must
/// be absolute and free of `..` components.
pub fn destination_allowed(allowed: &[PathBuf], destination: &Path) -> bool {
    if allowed.is_empty() {
        return true;
    }
    if !destination.is_absolute()
        || destination
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return false;
    }
    allowed.iter().any(|prefix| destination.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.boot_config, PathBuf::from("/boot/config.txt"));
        assert_eq!(settings.marker, DEFAULT_MARKER);
        assert!(settings.allowed_destinations.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str("boot_config = \"/tmp/config.txt\"\n").unwrap();
        assert_eq!(settings.boot_config, PathBuf::from("/tmp/config.txt"));
        assert_eq!(settings.marker, DEFAULT_MARKER);
        assert_eq!(settings.unzip_program, PathBuf::from("/usr/bin/unzip"));
    }

    #[test]
    fn test_unrestricted_destinations() {
        let settings = Settings::default();
        assert!(settings.destination_allowed(Path::new("/etc/anything")));
    }

    #[test]
    fn test_restricted_destinations() {
        let settings = Settings {
            allowed_destinations: vec![PathBuf::from("/boot")],
            ..Settings::default()
        };
        assert!(settings.destination_allowed(Path::new("/boot/overlays/x.dtbo")));
        assert!(!settings.destination_allowed(Path::new("/bootleg/x")));
        assert!(!settings.destination_allowed(Path::new("/boot/../etc/passwd")));
        assert!(!settings.destination_allowed(Path::new("boot/x")));
    }

    #[test]
    fn test_resolve_missing_explicit_file_fails() {
        let result = Settings::resolve(Some(Path::new("/nonexistent/frame-drivers.toml")));
        assert!(result.is_err());
    }
}
