//! ImageSource trait and image descriptors

use serde::{Deserialize, Serialize};

use crate::Result;

/// One image offered by a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Stable identifier, unique within the source
    pub id: String,
    /// Where to download the image from
    pub source: String,
    /// File name to store the download under
    pub filename: String,
    /// Known only after downloading, for most services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

impl ImageDescriptor {
    pub fn new(id: impl Into<String>, source: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            filename: filename.into(),
            mimetype: None,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }
}

/// Lazy sequence of images from one feed.
pub type Images<'a> = Box<dyn Iterator<Item = ImageDescriptor> + 'a>;

/// A read-only provider of images.
pub trait ImageSource: Send + Sync {
    /// Human readable service name, used in log messages.
    fn name(&self) -> &str;

    /// Images available from `feed`, in the order the service lists them.
    fn images_for(&self, feed: &str) -> Result<Images<'_>>;
}
