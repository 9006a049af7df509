//! [`TestSystem`] builder for device-layout test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary stand-in for the device filesystem.
///
/// Layout below [`TestSystem::root`]:
///
/// ```text
/// builtin/          read-only driver root
/// external/         installed driver root
/// boot/config.txt   shared boot configuration
/// dest/             where driver files get installed to
/// work/             temporary extraction directories
/// packages/         package trees waiting to be installed
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use frame_test_utils::TestSystem;
///
/// let system = TestSystem::new();
/// system.write_boot_config("gpu_mem=128\n");
/// assert_eq!(system.read_boot_config(), "gpu_mem=128\n");
/// ```
pub struct TestSystem {
    temp_dir: TempDir,
}

impl Default for TestSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSystem {
    /// Create the layout with an empty boot configuration.
    pub fn new() -> Self {
        let system = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        for dir in ["builtin", "boot", "dest", "work", "packages"] {
            fs::create_dir_all(system.root().join(dir)).unwrap();
        }
        system.write_boot_config("");
        system
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn builtin_root(&self) -> PathBuf {
        self.root().join("builtin")
    }

    /// Not created up front; the catalog creates it.
    pub fn external_root(&self) -> PathBuf {
        self.root().join("external")
    }

    pub fn boot_config(&self) -> PathBuf {
        self.root().join("boot").join("config.txt")
    }

    pub fn dest_dir(&self) -> PathBuf {
        self.root().join("dest")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root().join("work")
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.root().join("packages")
    }

    pub fn write_boot_config(&self, content: &str) {
        fs::write(self.boot_config(), content).unwrap();
    }

    pub fn read_boot_config(&self) -> String {
        fs::read_to_string(self.boot_config()).unwrap()
    }

    /// Content of `<boot config><suffix>`, if it exists.
    pub fn read_backup(&self, suffix: &str) -> Option<String> {
        let mut name = self.boot_config().into_os_string();
        name.push(suffix);
        fs::read_to_string(PathBuf::from(name)).ok()
    }

    /// Entries of `dir` by file name, sorted.
    pub fn list_dir(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Put a pre-installed driver into the built-in root.
    ///
    /// `descriptor_json` is written verbatim as `manifest.json`.
    pub fn add_builtin_driver(&self, name: &str, descriptor_json: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.builtin_root().join(name);
        fs::create_dir_all(&dir).unwrap();
        crate::write_tree(&dir, files);
        fs::write(dir.join("manifest.json"), descriptor_json).unwrap();
        dir
    }

    /// A settings file in TOML pointing every location into this system.
    pub fn settings_toml(&self) -> String {
        format!(
            "builtin_root = {:?}\nexternal_root = {:?}\nboot_config = {:?}\ntemp_root = {:?}\n",
            self.builtin_root().display().to_string(),
            self.external_root().display().to_string(),
            self.boot_config().display().to_string(),
            self.work_dir().display().to_string(),
        )
    }

    /// Write [`TestSystem::settings_toml`] to `settings.toml` and return its path.
    pub fn write_settings(&self) -> PathBuf {
        let path = self.root().join("settings.toml");
        fs::write(&path, self.settings_toml()).unwrap();
        path
    }
}
