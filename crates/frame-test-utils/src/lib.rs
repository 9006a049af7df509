//! Shared test utilities for the frame driver workspace.
//!
//! This crate provides standardised filesystem fixtures so crate test suites
//! don't each reinvent them. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`system`]: [`TestSystem`] temporary device layout (driver roots, boot config)
//! - [`package`]: helpers for writing driver package trees

pub mod package;
pub mod system;

pub use package::{write_manifest, write_tree};
pub use system::TestSystem;
