//! Marker-delimited managed sections in line-oriented files.
//!
//! A shared text file is split in two by a single marker line:
//!
//! ```text
//! user-owned line
//! user-owned line
//! ### MARKER ###
//! managed line
//! managed line
//! ```
//!
//! Everything above the marker belongs to whoever owns the file. The marker
//! and everything after it belongs to us and is regenerated wholesale, so
//! any trailing content that was appended below the marker is dropped on
//! the next rewrite.

pub mod section;

pub use section::{is_marker, managed_section, render, take_prefix};
