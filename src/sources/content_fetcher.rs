//! Content fetcher trait.

use crate::core::{FileSet, Namespace};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Lists the configuration files stored under a namespace.
///
/// The watcher calls this from its own task, so a slow fetch delays every
/// other read and subscription change until it returns.
///
/// Implement this trait to read configuration from somewhere other than
/// GitHub (a local checkout, an object store, a test double).
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Return every file currently stored under `namespace`, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Fetch`](crate::error::WatcherError::Fetch) if
    /// the remote cannot be queried.
    async fn fetch(&self, namespace: &Namespace) -> Result<FileSet>;
}

#[async_trait]
impl<F: ContentFetcher + ?Sized> ContentFetcher for Arc<F> {
    async fn fetch(&self, namespace: &Namespace) -> Result<FileSet> {
        (**self).fetch(namespace).await
    }
}
