//! Installed driver enumeration

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a listed driver lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverOrigin {
    Builtin,
    External,
}

/// Lists drivers from a built-in and an external root.
///
/// Each subdirectory of a root is one driver, named after the directory.
/// External drivers shadow built-in drivers of the same name.
#[derive(Debug, Clone)]
pub struct Catalog {
    builtin_root: PathBuf,
    external_root: PathBuf,
}

impl Catalog {
    /// Create a catalog, creating the external root if it is missing.
    ///
    /// Failure to create the external root is logged, not returned; the
    /// first operation that needs it will fail with its own error.
    pub fn new(builtin_root: impl Into<PathBuf>, external_root: impl Into<PathBuf>) -> Self {
        let catalog = Self {
            builtin_root: builtin_root.into(),
            external_root: external_root.into(),
        };
        if !catalog.external_root.exists()
            && let Err(e) = fs::create_dir_all(&catalog.external_root)
        {
            tracing::error!(
                "Unable to create driver directory {}: {}",
                catalog.external_root.display(),
                e
            );
        }
        catalog
    }

    pub fn builtin_root(&self) -> &Path {
        &self.builtin_root
    }

    pub fn external_root(&self) -> &Path {
        &self.external_root
    }

    /// All drivers by name, external entries winning over built-in ones.
    pub fn list(&self) -> BTreeMap<String, PathBuf> {
        let mut drivers = list_dir(&self.builtin_root);
        drivers.extend(list_dir(&self.external_root));
        drivers
    }

    /// Directory of the driver called `name`, if any.
    pub fn get(&self, name: &str) -> Option<PathBuf> {
        self.list().remove(name)
    }

    /// Which root `name` resolves to, if it exists.
    pub fn origin(&self, name: &str) -> Option<DriverOrigin> {
        if list_dir(&self.external_root).contains_key(name) {
            Some(DriverOrigin::External)
        } else if list_dir(&self.builtin_root).contains_key(name) {
            Some(DriverOrigin::Builtin)
        } else {
            None
        }
    }
}

/// Subdirectories of `root`. An unreadable or missing root contributes nothing.
fn list_dir(root: &Path) -> BTreeMap<String, PathBuf> {
    let mut result = BTreeMap::new();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Cannot list drivers in {}: {}", root.display(), e);
            }
            return result;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("Skipping driver directory with non-UTF-8 name: {}", path.display());
            continue;
        };
        result.insert(name, path);
    }
    result
}
