//! `INSTALL` manifest parsing.
//!
//! # Format
//!
//! ```text
//! # comment
//! [Install]
//! overlays/tft35a.dtbo = /boot/overlays/tft35a.dtbo
//!
//! [Config]
//! dtoverlay=tft35a:rotate=90
//! hdmi_cvt=480 320 60 6 0 0 0
//! ```
//!
//! Section headers are case-insensitive. Older packages carry an
//! `[Options]` section of `key = value` pairs instead of `[Config]`; those
//! are upgraded to config lines (see [`ManifestParser::parse`]).

use std::fs;
use std::path::{Path, PathBuf};

use frame_fs::{PackagePath, validate_path_identifier};

use crate::descriptor::{DriverDescriptor, InstallEntry, OptionMap, OptionValue};
use crate::error::{Error, Result};

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedManifest {
    /// Normalized descriptor; install sources are relative to `package_root`
    pub descriptor: DriverDescriptor,
    /// Directory holding the manifest
    pub package_root: PathBuf,
    /// Non-fatal problems, in the order they were found
    pub warnings: Vec<String>,
    /// Whether the manifest used the legacy `[Options]`-only format
    pub upgraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Install,
    Config,
    Options,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        match line.to_ascii_lowercase().as_str() {
            "[install]" => Some(Self::Install),
            "[config]" => Some(Self::Config),
            "[options]" => Some(Self::Options),
            _ => None,
        }
    }
}

/// Parser for `INSTALL` manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestParser;

impl ManifestParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the manifest at `manifest`.
    ///
    /// The driver is named after the manifest's directory. Every install
    /// source must be a relative path without `..` that names an existing
    /// file inside that directory. Parsing is all-or-nothing: the first
    /// problem aborts with [`Error::Parse`].
    ///
    /// If no `[Config]` section appears, the manifest is treated as schema 1:
    /// its options become `key=value` config lines in the order written and
    /// are then dropped. The returned descriptor is always current-schema.
    pub fn parse(&self, manifest: &Path) -> Result<ParsedManifest> {
        let package_root = manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let driver_name = package_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        validate_path_identifier(&driver_name, "Driver name").map_err(|reason| Error::Parse {
            path: manifest.to_path_buf(),
            line: None,
            reason,
        })?;

        let content = fs::read_to_string(manifest).map_err(|e| Error::Parse {
            path: manifest.to_path_buf(),
            line: None,
            reason: format!("cannot read manifest: {e}"),
        })?;

        let mut state = ParseState {
            manifest,
            package_root,
            section: Section::None,
            install: Vec::new(),
            config: None,
            options: None,
            warnings: Vec::new(),
        };
        for (index, raw) in content.lines().enumerate() {
            state.feed(raw, index + 1)?;
        }

        Ok(state.finish(driver_name))
    }
}

struct ParseState<'a> {
    manifest: &'a Path,
    package_root: &'a Path,
    section: Section,
    install: Vec<InstallEntry>,
    config: Option<Vec<String>>,
    options: Option<OptionMap>,
    warnings: Vec<String>,
}

impl ParseState<'_> {
    fn feed(&mut self, raw: &str, line_no: usize) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if let Some(section) = Section::from_header(line) {
            // Re-entering a section appends to what it already holds
            match section {
                Section::Config => {
                    self.config.get_or_insert_with(Vec::new);
                }
                Section::Options => {
                    self.options.get_or_insert_with(OptionMap::new);
                }
                Section::Install | Section::None => {}
            }
            self.section = section;
            return Ok(());
        }

        match self.section {
            Section::None => {
                self.warn(format!("Ignoring content outside of any section (line {line_no})"));
            }
            Section::Install => self.install_line(line, line_no)?,
            Section::Config => self
                .config
                .get_or_insert_with(Vec::new)
                .push(line.to_string()),
            Section::Options => self.option_line(line, line_no)?,
        }
        Ok(())
    }

    fn install_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let (source, destination) = line
            .split_once('=')
            .ok_or_else(|| self.error(line_no, "install entries must be 'source = destination'"))?;
        let (source, destination) = (source.trim(), destination.trim());

        if source.is_empty() || destination.is_empty() {
            return Err(self.error(
                line_no,
                "install section cannot have an empty source or destination",
            ));
        }

        let package_path = PackagePath::parse(source).map_err(|e| {
            self.error(line_no, format!("install section must use files within package: {e}"))
        })?;

        if !self.package_root.join(package_path.to_native()).is_file() {
            return Err(self.error(
                line_no,
                format!("manifest points to non-existent file '{source}'"),
            ));
        }
        package_path.contained_in(self.package_root).map_err(|e| {
            self.error(line_no, format!("install section must use files within package: {e}"))
        })?;

        self.install.push(InstallEntry {
            source: package_path.to_native(),
            destination: PathBuf::from(destination),
        });
        Ok(())
    }

    fn option_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| self.error(line_no, "options must be 'key = value'"))?;
        let (key, value) = (key.trim(), value.trim());

        if key.is_empty() || value.is_empty() {
            return Err(self.error(line_no, "options section cannot have an empty key or value"));
        }

        let previous = self
            .options
            .get_or_insert_with(OptionMap::new)
            .insert(key, OptionValue::coerce(value));
        if previous.is_some() {
            self.warn(format!(
                "Key \"{key}\" will be overridden since it is defined multiple times (line {line_no})"
            ));
        }
        Ok(())
    }

    fn finish(self, driver_name: String) -> ParsedManifest {
        let upgraded = self.config.is_none();
        let (config_lines, options) = match self.config {
            Some(lines) => (lines, self.options.unwrap_or_default()),
            None => {
                tracing::info!(
                    "{} has no [Config] section, upgrading legacy options",
                    self.manifest.display()
                );
                let lines = self
                    .options
                    .map(|options| options.to_config_lines())
                    .unwrap_or_default();
                (lines, OptionMap::new())
            }
        };

        ParsedManifest {
            descriptor: DriverDescriptor {
                install_entries: self.install,
                config_lines,
                options,
                ..DriverDescriptor::new(driver_name)
            },
            package_root: self.package_root.to_path_buf(),
            warnings: self.warnings,
            upgraded,
        }
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{}: {}", self.manifest.display(), message);
        self.warnings.push(message);
    }

    fn error(&self, line_no: usize, reason: impl Into<String>) -> Error {
        let err = Error::parse(self.manifest, line_no, reason);
        tracing::error!("{err}");
        err
    }
}
