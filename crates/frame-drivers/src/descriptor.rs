//! Structured driver descriptor and its persisted form.
//!
//! The descriptor is written once at install time as `manifest.json` inside
//! the driver directory and read back at activation time. The JSON keys
//! keep their historical names:
//!
//! ```json
//! {
//!   "version": 2,
//!   "driver": "tft35a",
//!   "install": [{ "src": "tft35a.dtbo", "dst": "/boot/overlays/tft35a.dtbo" }],
//!   "config": ["dtoverlay=tft35a"],
//!   "options": { "rotate": true }
//! }
//! ```
//!
//! Files without `version` predate schema 2 and are migrated on load, see
//! [`migrate_legacy`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::{DESCRIPTOR_FILENAME, SCHEMA_VERSION};

/// A single option value from a manifest's `[Options]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// `true`/`yes` and `false`/`no` (any case) become booleans, anything
    /// else stays text.
    pub fn coerce(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" => Self::Bool(true),
            "false" | "no" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Insertion-ordered string-keyed option mapping.
///
/// Order matters: legacy manifests turn their options into config lines
/// in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`, keeping its original position on overwrite.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `key=value` lines in insertion order.
    pub fn to_config_lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

impl FromIterator<(String, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of option names to strings or booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<OptionMap, A::Error> {
                let mut map = OptionMap::new();
                while let Some((k, v)) = access.next_entry::<String, OptionValue>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}

/// A file to copy when the driver is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallEntry {
    /// Package-relative path while parsing; flat file name inside the
    /// driver directory once installed
    #[serde(rename = "src")]
    pub source: PathBuf,
    /// Absolute destination chosen by the driver author
    #[serde(rename = "dst")]
    pub destination: PathBuf,
}

/// Structured form of an `INSTALL` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDescriptor {
    #[serde(rename = "version")]
    pub schema_version: u32,
    /// Name of the directory the manifest came from
    #[serde(rename = "driver", default)]
    pub driver_name: String,
    #[serde(rename = "install", default)]
    pub install_entries: Vec<InstallEntry>,
    /// Raw lines for the boot configuration's generated section, in order
    #[serde(rename = "config", default)]
    pub config_lines: Vec<String>,
    /// Driver-specific hints handed back on activation
    #[serde(default, skip_serializing_if = "OptionMap::is_empty")]
    pub options: OptionMap,
}

impl DriverDescriptor {
    /// An empty current-schema descriptor.
    pub fn new(driver_name: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            driver_name: driver_name.into(),
            install_entries: Vec::new(),
            config_lines: Vec::new(),
            options: OptionMap::new(),
        }
    }

    /// Path of the persisted descriptor inside `driver_dir`.
    pub fn path_in(driver_dir: &Path) -> PathBuf {
        driver_dir.join(DESCRIPTOR_FILENAME)
    }

    /// Write the descriptor into `driver_dir`.
    pub fn save(&self, driver_dir: &Path) -> Result<()> {
        frame_fs::ConfigStore::new().save(&Self::path_in(driver_dir), self)?;
        Ok(())
    }

    /// Read the descriptor persisted in `driver_dir`, migrating legacy files.
    ///
    /// A missing driver name is filled in from the directory name.
    pub fn load(driver_dir: &Path) -> Result<Self> {
        let path = Self::path_in(driver_dir);
        let load_error = |reason: String| Error::DescriptorLoad {
            path: path.clone(),
            reason,
        };

        let content = frame_fs::io::read_text(&path).map_err(|e| load_error(e.to_string()))?;
        let raw: Value = serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        let Value::Object(mut raw) = raw else {
            return Err(load_error("expected a JSON object".into()));
        };

        if migrate_legacy(&mut raw) {
            tracing::debug!("Migrated legacy descriptor {}", path.display());
        }

        let mut descriptor: Self =
            serde_json::from_value(Value::Object(raw)).map_err(|e| load_error(e.to_string()))?;

        if descriptor.schema_version > SCHEMA_VERSION {
            return Err(load_error(format!(
                "schema version {} is newer than supported version {}",
                descriptor.schema_version, SCHEMA_VERSION
            )));
        }
        descriptor.schema_version = SCHEMA_VERSION;

        if descriptor.driver_name.is_empty() {
            descriptor.driver_name = driver_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if descriptor.driver_name.is_empty() {
            return Err(load_error("driver name is missing".into()));
        }

        Ok(descriptor)
    }
}

/// One historical schema change applied to a raw descriptor object.
type Migration = fn(&mut Map<String, Value>);

/// Migrations for descriptors written without a `version` key, in the order
/// the schema changes happened.
///
/// The first release stored config lines under `options` and driver hints
/// under `special`. The lines later moved to `config`, and only after that
/// did `special` become `options`. Running these out of order would turn
/// the hints into config lines.
const LEGACY_MIGRATIONS: &[(&str, Migration)] = &[
    ("options -> config", rename_options_to_config),
    ("special -> options", rename_special_to_options),
];

/// Upgrade a raw descriptor lacking `version` to the current schema.
///
/// Returns whether anything was migrated. Current-schema objects are left
/// untouched.
pub fn migrate_legacy(raw: &mut Map<String, Value>) -> bool {
    if raw.contains_key("version") {
        return false;
    }
    for (label, migration) in LEGACY_MIGRATIONS {
        tracing::trace!("Applying descriptor migration {label}");
        migration(raw);
    }
    raw.insert("version".into(), Value::from(SCHEMA_VERSION));
    true
}

fn rename_options_to_config(raw: &mut Map<String, Value>) {
    rename_key(raw, "options", "config");
}

fn rename_special_to_options(raw: &mut Map<String, Value>) {
    rename_key(raw, "special", "options");
}

fn rename_key(raw: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = raw.remove(from) {
        raw.insert(to.to_string(), value);
    }
}
