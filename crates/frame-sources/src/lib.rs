//! Image source providers.
//!
//! Photo services (albums, feeds, keyword searches) are read-only adapters
//! that turn a feed identifier into a list of [`ImageDescriptor`]s. This
//! crate defines that seam and the bookkeeping shared by every provider:
//! feeds that keep producing broken images are skipped until the tracker
//! is reset.
//!
//! Fetching, image selection and display are up to the caller.

pub mod error;
pub mod guard;
pub mod source;

pub use error::{Error, Result};
pub use guard::{BrokenFeeds, GuardedSource};
pub use source::{ImageDescriptor, ImageSource, Images};
