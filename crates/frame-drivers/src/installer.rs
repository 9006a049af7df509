//! Driver package installation.
//!
//! Installing stages a driver; it does not make it active. The steps are
//! strict gates, and the first failure aborts the rest:
//!
//! 1. extract the package into a fresh temporary directory
//! 2. locate the `INSTALL` manifest
//! 3. parse and validate it
//! 4. replace `<external root>/<driver name>` with an empty directory
//! 5. copy every install source into it under a flattened file name
//! 6. persist the descriptor, now pointing at the flattened names
//!
//! The temporary directory is always removed. The driver directory is
//! removed again if anything fails after it was created, so it is either
//! complete or absent.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use frame_fs::{flatten_file_name, io::remove_dir_logged, validate_path_identifier};
use tempfile::TempDir;

use crate::catalog::{Catalog, DriverOrigin};
use crate::descriptor::{DriverDescriptor, InstallEntry};
use crate::error::{Error, Result};
use crate::manifest::ManifestParser;
use crate::settings::Settings;
use crate::{DESCRIPTOR_FILENAME, MANIFEST_FILENAME};

/// Unpacks a driver package.
pub trait Extractor {
    /// Unpack `archive` into `destination`, which already exists and is empty.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Extracts zip packages with an external `unzip` binary.
///
/// Runs `<program> <archive> -d <destination>` with output discarded.
#[derive(Debug, Clone)]
pub struct UnzipExtractor {
    program: PathBuf,
}

impl UnzipExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Extractor for UnzipExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .arg(archive)
            .arg("-d")
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::Extraction {
                archive: archive.to_path_buf(),
                reason: format!("cannot run {}: {}", self.program.display(), e),
            })?;

        if !status.success() {
            return Err(Error::Extraction {
                archive: archive.to_path_buf(),
                reason: match status.code() {
                    Some(code) => format!("{} exited with status {}", self.program.display(), code),
                    None => format!("{} was terminated by a signal", self.program.display()),
                },
            });
        }
        Ok(())
    }
}

/// Installs driver packages into the external driver root.
#[derive(Debug, Clone)]
pub struct PackageInstaller<E = UnzipExtractor> {
    external_root: PathBuf,
    temp_root: Option<PathBuf>,
    extractor: E,
    parser: ManifestParser,
}

impl PackageInstaller<UnzipExtractor> {
    /// Installer using the configured roots and `unzip` program.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut installer = Self::new(
            &settings.external_root,
            UnzipExtractor::new(&settings.unzip_program),
        );
        installer.temp_root = settings.temp_root.clone();
        installer
    }
}

impl<E: Extractor> PackageInstaller<E> {
    pub fn new(external_root: impl Into<PathBuf>, extractor: E) -> Self {
        Self {
            external_root: external_root.into(),
            temp_root: None,
            extractor,
            parser: ManifestParser::new(),
        }
    }

    /// Create temporary extraction directories under `temp_root`.
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(temp_root.into());
        self
    }

    /// Install the package at `archive`, replacing any external driver of
    /// the same name.
    ///
    /// Returns the persisted descriptor, whose install sources are file
    /// names inside the new driver directory.
    pub fn install(&self, archive: &Path) -> Result<DriverDescriptor> {
        let workdir = self.workdir(archive)?;
        let result = self.install_from(archive, workdir.path());

        let workdir_path = workdir.path().to_path_buf();
        if let Err(e) = workdir.close() {
            tracing::warn!("Failed to delete {}: {}", workdir_path.display(), e);
        }

        if let Err(e) = &result {
            tracing::error!("Driver installation from {} aborted: {}", archive.display(), e);
        }
        result
    }

    fn install_from(&self, archive: &Path, workdir: &Path) -> Result<DriverDescriptor> {
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| validate_path_identifier(s, "Package name").is_ok())
            .unwrap_or_else(|| "package".to_string());
        let extract_root = workdir.join(stem);
        fs::create_dir(&extract_root).map_err(|e| Error::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("cannot create {}: {}", extract_root.display(), e),
        })?;

        tracing::debug!("Extracting {} into {}", archive.display(), extract_root.display());
        self.extractor.extract(archive, &extract_root)?;

        let manifest = find_manifest(workdir).ok_or_else(|| Error::ManifestMissing {
            archive: archive.to_path_buf(),
        })?;
        let parsed = self.parser.parse(&manifest)?;
        let mut descriptor = parsed.descriptor;

        let planned = plan_copies(&manifest, &descriptor)?;

        let driver_dir = self.external_root.join(&descriptor.driver_name);
        if driver_dir.exists() {
            tracing::info!("{} already exists, deleting before installing", driver_dir.display());
            fs::remove_dir_all(&driver_dir).map_err(|e| frame_fs::Error::io(&driver_dir, e))?;
        }
        fs::create_dir_all(&self.external_root)
            .map_err(|e| frame_fs::Error::io(&self.external_root, e))?;
        let staged = StagedDir::create(driver_dir)?;

        let mut installed = Vec::with_capacity(planned.len());
        for (entry, flat_name) in descriptor.install_entries.iter().zip(planned) {
            let from = parsed.package_root.join(&entry.source);
            let to = staged.path().join(&flat_name);
            frame_fs::io::copy_file(&from, &to).map_err(|source| Error::Copy {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            installed.push(InstallEntry {
                source: PathBuf::from(flat_name),
                destination: entry.destination.clone(),
            });
        }
        descriptor.install_entries = installed;
        descriptor.save(staged.path())?;

        let driver_dir = staged.commit();
        tracing::info!(
            "Installed driver '{}' into {}",
            descriptor.driver_name,
            driver_dir.display()
        );
        Ok(descriptor)
    }

    /// Delete an installed external driver.
    ///
    /// Built-in drivers cannot be removed. If an external driver shadows a
    /// built-in one, removing it uncovers the built-in driver again.
    pub fn remove(&self, catalog: &Catalog, name: &str) -> Result<()> {
        validate_path_identifier(name, "Driver name").map_err(Error::InvalidName)?;
        match catalog.origin(name) {
            Some(DriverOrigin::External) => {
                let dir = self.external_root.join(name);
                fs::remove_dir_all(&dir).map_err(|e| frame_fs::Error::io(&dir, e))?;
                tracing::info!("Removed driver '{}'", name);
                Ok(())
            }
            Some(DriverOrigin::Builtin) => Err(Error::BuiltinReadOnly(name.to_string())),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    fn workdir(&self, archive: &Path) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("frame-driver-");
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| Error::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("cannot create temporary directory: {e}"),
        })
    }
}

/// Flattened destination names for each install entry.
///
/// Two entries flattening to the same name, or a name equal to the
/// descriptor's, reject the package. Checked before the driver directory is
/// touched so an unusable package never deletes an existing installation.
fn plan_copies(manifest: &Path, descriptor: &DriverDescriptor) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(descriptor.install_entries.len());

    for entry in &descriptor.install_entries {
        let base = entry
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let flat_name = flatten_file_name(&base);

        if flat_name == DESCRIPTOR_FILENAME {
            return Err(Error::Parse {
                path: manifest.to_path_buf(),
                line: None,
                reason: format!(
                    "install source '{}' collides with the driver descriptor",
                    entry.source.display()
                ),
            });
        }
        if !seen.insert(flat_name.clone()) {
            return Err(Error::Parse {
                path: manifest.to_path_buf(),
                line: None,
                reason: format!(
                    "install source '{}' flattens to '{}', which an earlier entry already uses",
                    entry.source.display(),
                    flat_name
                ),
            });
        }
        planned.push(flat_name);
    }
    Ok(planned)
}

/// Find the first file named `INSTALL` below `root`.
///
/// Walks top-down in name order: a directory's own files are checked before
/// its subdirectories. Symlinks are not followed.
pub fn find_manifest(root: &Path) -> Option<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(root).ok()?.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_file() && entry.file_name() == MANIFEST_FILENAME {
            return Some(entry.path());
        }
        if file_type.is_dir() {
            subdirs.push(entry.path());
        }
    }

    subdirs.iter().find_map(|dir| find_manifest(dir))
}

/// A freshly created directory, deleted on drop unless committed.
struct StagedDir {
    path: PathBuf,
    committed: bool,
}

impl StagedDir {
    fn create(path: PathBuf) -> Result<Self> {
        fs::create_dir(&path).map_err(|e| frame_fs::Error::io(&path, e))?;
        Ok(Self {
            path,
            committed: false,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.path.clone()
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if !self.committed {
            tracing::warn!("Removing partially installed {}", self.path.display());
            remove_dir_logged(&self.path);
        }
    }
}
