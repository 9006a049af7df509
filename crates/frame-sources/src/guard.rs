//! Broken feed tracking

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::source::{ImageSource, Images};
use crate::Result;

/// Set of feeds that produced broken or unsupported images.
///
/// Broken feeds stay broken until forgotten individually or until the whole
/// set is reset, which gives every feed another try (the service may only
/// have been unavailable for a while).
#[derive(Debug, Default)]
pub struct BrokenFeeds {
    feeds: RwLock<HashSet<String>>,
}

impl BrokenFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `feed` as broken. Returns `false` if it already was.
    pub fn mark_broken(&self, feed: &str) -> bool {
        self.feeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(feed.to_string())
    }

    pub fn is_broken(&self, feed: &str) -> bool {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(feed)
    }

    /// Drop `feed` from the set, e.g. when it is removed from the configuration.
    pub fn forget(&self, feed: &str) -> bool {
        self.feeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(feed)
    }

    /// Give every feed another try.
    pub fn reset(&self) {
        self.feeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.feeds.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wraps a source so feeds marked broken yield no images.
///
/// A feed becomes broken when the wrapped source fails to read it, or when
/// the caller reports a bad image through [`GuardedSource::report_broken`].
#[derive(Debug)]
pub struct GuardedSource<S> {
    inner: S,
    broken: BrokenFeeds,
}

impl<S: ImageSource> GuardedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            broken: BrokenFeeds::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn broken_feeds(&self) -> &BrokenFeeds {
        &self.broken
    }

    /// Mark `feed` broken after one of its images turned out unusable.
    pub fn report_broken(&self, feed: &str, reason: &str) {
        if self.broken.mark_broken(feed) {
            tracing::warn!(
                "{}: feed '{}' is broken ({}), skipping it until reset",
                self.inner.name(),
                feed,
                reason
            );
        }
    }

    pub fn reset(&self) {
        self.broken.reset();
    }
}

impl<S: ImageSource> ImageSource for GuardedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn images_for(&self, feed: &str) -> Result<Images<'_>> {
        if self.broken.is_broken(feed) {
            tracing::debug!("{}: skipping broken feed '{}'", self.inner.name(), feed);
            return Ok(Box::new(std::iter::empty()));
        }
        self.inner.images_for(feed).inspect_err(|e| {
            self.report_broken(feed, &e.to_string());
        })
    }
}
