//! Filesystem primitives for the frame driver manager
//!
//! Provides package-relative path validation, atomic writes, line-file
//! output and format-agnostic settings loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{PackagePath, flatten_file_name, sibling_with_suffix, validate_path_identifier};
