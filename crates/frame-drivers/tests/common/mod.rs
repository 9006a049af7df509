//! Helpers shared by the frame-drivers integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use frame_drivers::{Catalog, Error, Extractor, PackageInstaller, Result};
use frame_test_utils::TestSystem;

/// "Extracts" a package that is already an unpacked directory tree.
pub struct TreeExtractor;

impl Extractor for TreeExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        copy_tree(archive, destination).map_err(|e| Error::Extraction {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Always fails, as a corrupt archive would.
pub struct BrokenExtractor;

impl Extractor for BrokenExtractor {
    fn extract(&self, archive: &Path, _destination: &Path) -> Result<()> {
        Err(Error::Extraction {
            archive: archive.to_path_buf(),
            reason: "corrupt archive".into(),
        })
    }
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

pub fn installer(system: &TestSystem) -> PackageInstaller<TreeExtractor> {
    PackageInstaller::new(system.external_root(), TreeExtractor).with_temp_root(system.work_dir())
}

pub fn catalog(system: &TestSystem) -> Catalog {
    Catalog::new(system.builtin_root(), system.external_root())
}

/// Write an unpacked package named `name` and return its path.
pub fn package(system: &TestSystem, name: &str, manifest: &str, files: &[(&str, &str)]) -> std::path::PathBuf {
    frame_test_utils::write_manifest(&system.packages_dir(), name, manifest, files);
    system.packages_dir().join(name)
}

/// Extracts like [`TreeExtractor`], then makes one file unreadable.
#[cfg(unix)]
pub struct LockingExtractor(pub &'static str);

#[cfg(unix)]
impl Extractor for LockingExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        TreeExtractor.extract(archive, destination)?;
        fs::set_permissions(destination.join(self.0), fs::Permissions::from_mode(0o200)).map_err(|e| {
            Error::Extraction {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }
}

/// Whether file modes are not enforced for this process, as for root.
#[cfg(unix)]
pub fn modes_ignored(system: &TestSystem) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let sample = system.root().join("mode-check");
    fs::write(&sample, "sample").unwrap();
    fs::set_permissions(&sample, fs::Permissions::from_mode(0o200)).unwrap();
    let readable = fs::read(&sample).is_ok();
    fs::remove_file(&sample).unwrap();
    readable
}
