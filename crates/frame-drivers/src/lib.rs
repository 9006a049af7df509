//! Display driver packaging, installation and activation.
//!
//! A driver is a bundle of files plus a handful of boot-configuration lines.
//! This crate turns an uploaded package into an installed driver directory
//! and makes one driver at a time active on the system:
//!
//! - **Catalog**: lists drivers from a read-only built-in root and a writable
//!   external root; external entries shadow built-in ones of the same name.
//! - **ManifestParser**: reads the `INSTALL` manifest into a [`DriverDescriptor`],
//!   upgrading the legacy `[Options]`-only format.
//! - **PackageInstaller**: extracts a package, validates and copies its files
//!   into an isolated driver directory, and persists the descriptor.
//! - **Activator**: copies a driver's files to their destinations and rewrites
//!   the managed section of the shared boot configuration file.
//!
//! # Architecture
//!
//! ```text
//!            PackageInstaller        Activator
//!             |         |            |       |
//!     ManifestParser  Extractor   Catalog  BootConfig
//!             |                      |       |
//!             +------ frame-fs ------+  frame-blocks
//! ```
//!
//! Nothing here locks. Install and activate calls touching the same driver
//! or the same boot configuration must be serialized by the caller.

pub mod activator;
pub mod boot_config;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod settings;

/// Name of the manifest file searched for inside a package.
pub const MANIFEST_FILENAME: &str = "INSTALL";

/// Name of the persisted descriptor inside each driver directory.
pub const DESCRIPTOR_FILENAME: &str = "manifest.json";

/// Descriptor schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 2;

pub use activator::Activator;
pub use boot_config::BootConfig;
pub use catalog::{Catalog, DriverOrigin};
pub use descriptor::{DriverDescriptor, InstallEntry, OptionMap, OptionValue};
pub use error::{Error, PatchStage, Result};
pub use installer::{Extractor, PackageInstaller, UnzipExtractor, find_manifest};
pub use manifest::{ManifestParser, ParsedManifest};
pub use settings::Settings;
