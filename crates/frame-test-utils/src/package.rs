//! Driver package trees on disk.

use std::fs;
use std::path::{Path, PathBuf};

/// Write `files` (relative path, content) below `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}

/// Create `<root>/<driver>/INSTALL` with `manifest` and the given payload.
///
/// Returns the manifest path.
pub fn write_manifest(root: &Path, driver: &str, manifest: &str, files: &[(&str, &str)]) -> PathBuf {
    let package = root.join(driver);
    fs::create_dir_all(&package).unwrap();
    write_tree(&package, files);
    let path = package.join("INSTALL");
    fs::write(&path, manifest).unwrap();
    path
}
