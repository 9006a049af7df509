//! Error types for frame-drivers

use std::path::PathBuf;

/// Result type for frame-drivers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Step of the boot configuration rewrite that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStage {
    /// Reading the current file
    Read,
    /// Writing the `.new` sibling
    WriteNew,
    /// Moving the current file to `.old`
    RenameCurrent,
    /// Moving `.new` into the canonical location
    RenameNew,
    /// Promoting `.old` to `.original`
    RetainBackup,
}

impl PatchStage {
    /// Whether the canonical file may already have been moved.
    pub fn past_rename_boundary(self) -> bool {
        matches!(
            self,
            Self::RenameCurrent | Self::RenameNew | Self::RetainBackup
        )
    }
}

impl std::fmt::Display for PatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            Self::Read => "read",
            Self::WriteNew => "write replacement for",
            Self::RenameCurrent => "move aside",
            Self::RenameNew => "move replacement into place for",
            Self::RetainBackup => "preserve the original copy of",
        };
        f.write_str(action)
    }
}

/// Errors that can occur while installing or activating drivers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or unsafe manifest
    #[error("Invalid manifest {path}{}: {reason}", at_line(.line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },

    /// Archive could not be extracted
    #[error("Failed to extract {archive}: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    /// Archive extracted but holds no manifest
    #[error("No INSTALL manifest found in {archive}")]
    ManifestMissing { archive: PathBuf },

    /// File copy failed during install or activation
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Boot configuration could not be rewritten
    #[error("Failed to {stage} {path}: {source}{}", recovery_hint(.stage, .path))]
    ConfigPatch {
        path: PathBuf,
        stage: PatchStage,
        #[source]
        source: frame_fs::Error,
    },

    /// Unknown driver name
    #[error("Driver not found: {0}")]
    NotFound(String),

    /// Persisted descriptor unreadable or malformed
    #[error("Failed to load descriptor {path}: {reason}")]
    DescriptorLoad { path: PathBuf, reason: String },

    /// Install destination outside the configured allow-list
    #[error("Driver '{driver}' may not install to {destination}")]
    DestinationRejected {
        driver: String,
        destination: PathBuf,
    },

    /// Attempt to remove a built-in driver
    #[error("Driver '{0}' is built in and cannot be removed")]
    BuiltinReadOnly(String),

    /// Driver name unusable as a directory name
    #[error("Invalid driver name: {0}")]
    InvalidName(String),

    /// Filesystem error from frame-fs
    #[error(transparent)]
    Fs(#[from] frame_fs::Error),
}

impl Error {
    /// Whether the boot configuration may need restoring by hand.
    pub fn requires_manual_recovery(&self) -> bool {
        matches!(self, Self::ConfigPatch { stage, .. } if stage.past_rename_boundary())
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: Some(line),
            reason: reason.into(),
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {n})"),
        None => String::new(),
    }
}

fn recovery_hint(stage: &PatchStage, path: &std::path::Path) -> String {
    if stage.past_rename_boundary() {
        format!(
            "; {} may need to be restored manually from its .old or .original copy",
            path.display()
        )
    } else {
        String::new()
    }
}
