//! Error types for frame-sources

/// Result type for frame-sources operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by image sources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The feed could not be read
    #[error("Failed to fetch feed {feed}: {reason}")]
    Fetch { feed: String, reason: String },
}

impl Error {
    pub fn fetch(feed: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            feed: feed.into(),
            reason: reason.into(),
        }
    }
}
