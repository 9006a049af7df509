//! Rewriting the shared boot configuration file.
//!
//! The file is owned by the system; only the section from the marker line
//! onwards is ours. A rewrite goes through a `.new` sibling and two renames
//! so the canonical path always holds either the complete old file or the
//! complete new one. Backups kept next to it:
//!
//! - `<file>.original`: the file as it was before the first rewrite, kept forever
//! - `<file>.old`: the file as it was before the latest rewrite; absent right
//!   after the first rewrite, whose previous version became `.original`
//!
//! `.old` is kept rather than deleted once `.original` exists, so the
//! generation before the latest rewrite always stays on disk.
//!
//! The user-owned part is copied byte for byte, so a file that is not valid
//! UTF-8 is still rewritten without loss.

use std::fs;
use std::path::{Path, PathBuf};

use frame_fs::sibling_with_suffix;

use crate::error::{Error, PatchStage, Result};
use crate::settings::Settings;

/// The shared boot configuration file and its marker.
#[derive(Debug, Clone)]
pub struct BootConfig {
    path: PathBuf,
    marker: String,
}

impl BootConfig {
    pub fn new(path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            marker: marker.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.boot_config, &settings.marker)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Sibling the replacement is written to before it is renamed into place.
    pub fn new_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".new")
    }

    /// Sibling holding the version before the latest rewrite, once
    /// `.original` exists.
    pub fn old_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".old")
    }

    /// Sibling holding the file as it was before it was ever managed.
    pub fn original_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".original")
    }

    /// Lines currently in the managed section, `None` if there is no marker.
    pub fn managed_lines(&self) -> Result<Option<Vec<String>>> {
        let bytes = fs::read(&self.path).map_err(|e| frame_fs::Error::io(&self.path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(frame_blocks::managed_section(&content, &self.marker)
            .map(|lines| lines.into_iter().map(str::to_string).collect()))
    }

    /// Replace the managed section with `config_lines`.
    ///
    /// Everything from the first marker line on is discarded, including
    /// anything someone else appended after our section. With no config
    /// lines the marker is dropped too, leaving only the user-owned part.
    ///
    /// Failures before the renames leave the canonical file untouched.
    /// Failures during or after them are reported with
    /// [`Error::requires_manual_recovery`] set.
    pub fn apply<S: AsRef<str>>(&self, config_lines: &[S]) -> Result<()> {
        let content = fs::read(&self.path)
            .map_err(|e| self.fail(PatchStage::Read, frame_fs::Error::io(&self.path, e)))?;
        let rewritten = frame_blocks::render(&content, &self.marker, config_lines);

        let new_path = self.new_path();
        if let Err(e) = frame_fs::io::write_synced(&new_path, &rewritten) {
            let _ = fs::remove_file(&new_path);
            return Err(self.fail(PatchStage::WriteNew, e));
        }

        let old_path = self.old_path();
        rename(&self.path, &old_path).map_err(|e| self.fail(PatchStage::RenameCurrent, e))?;
        rename(&new_path, &self.path).map_err(|e| self.fail(PatchStage::RenameNew, e))?;

        // The first rewrite's previous version is the pristine file; later
        // ones leave `.old` as the single rollback generation.
        let original_path = self.original_path();
        if !original_path.exists() {
            tracing::info!(
                "Keeping pristine copy of {} as {}",
                self.path.display(),
                original_path.display()
            );
            rename(&old_path, &original_path)
                .map_err(|e| self.fail(PatchStage::RetainBackup, e))?;
        }

        tracing::debug!(
            "Rewrote {} with {} managed lines",
            self.path.display(),
            config_lines.len()
        );
        Ok(())
    }

    fn fail(&self, stage: PatchStage, source: frame_fs::Error) -> Error {
        let err = Error::ConfigPatch {
            path: self.path.clone(),
            stage,
            source,
        };
        tracing::error!("{err}");
        err
    }
}

fn rename(from: &Path, to: &Path) -> std::result::Result<(), frame_fs::Error> {
    fs::rename(from, to).map_err(|e| frame_fs::Error::io(to, e))
}
