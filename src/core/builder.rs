//! Builder for constructing ConfigWatcher instances.

use crate::core::watcher::{Actor, ConfigWatcher};
use crate::core::Config;
use crate::error::{Result, WatcherError};
use crate::sources::ContentFetcher;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Number of queued reads and subscription changes before senders wait.
const INBOX_CAPACITY: usize = 32;

/// Builder for constructing a [`ConfigWatcher`].
///
/// A content source is mandatory: supply one with
/// [`with_fetcher`](Self::with_fetcher) or, with the `github` feature,
/// [`with_token`](Self::with_token). When both are given the last call wins.
///
/// # Examples
///
/// ```rust,no_run
/// use github_config_watcher::prelude::*;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<()> {
/// let shutdown = CancellationToken::new();
/// let watcher = ConfigWatcher::builder(Config::new("owner", "repo", "bot/config"))
///     .with_token(std::env::var("GITHUB_TOKEN").unwrap_or_default())
///     .with_cancellation(shutdown.clone())
///     .build()?;
///
/// // Later, stop polling
/// shutdown.cancel();
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcherBuilder {
    config: Config,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    #[cfg(feature = "github")]
    token: Option<String>,
    cancel: Option<CancellationToken>,
}

impl ConfigWatcherBuilder {
    /// Create a new builder around the given settings.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: None,
            #[cfg(feature = "github")]
            token: None,
            cancel: None,
        }
    }

    /// Use a custom content fetcher.
    pub fn with_fetcher<F: ContentFetcher + 'static>(self, fetcher: F) -> Self {
        self.with_shared_fetcher(Arc::new(fetcher))
    }

    /// Use a content fetcher that is shared with other code.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        #[cfg(feature = "github")]
        {
            self.token = None;
        }
        self
    }

    /// Fetch from GitHub, authenticating with a personal access token.
    #[cfg(feature = "github")]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.fetcher = None;
        self
    }

    /// Stop the watcher when `token` is cancelled.
    ///
    /// Without this, the watcher runs until [`ConfigWatcher::stop`] is called
    /// or every handle is dropped.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the settings and start the watcher task.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Construction`] if:
    /// - No fetcher or token is provided
    /// - The interval or timeout is zero
    /// - It is called outside a tokio runtime
    pub fn build(self) -> Result<ConfigWatcher> {
        if self.config.interval.is_zero() {
            return Err(WatcherError::Construction(
                "polling interval must be greater than zero".to_string(),
            ));
        }
        if self.config.timeout.is_zero() {
            return Err(WatcherError::Construction(
                "read timeout must be greater than zero".to_string(),
            ));
        }

        let fetcher = self.resolve_fetcher()?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            WatcherError::Construction(format!("a tokio runtime is required: {}", e))
        })?;

        let config = Arc::new(self.config);
        let cancel = self.cancel.unwrap_or_else(CancellationToken::new);
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Actor::new(Arc::clone(&config), fetcher, inbox, cancel.clone());
        runtime.spawn(actor.run());

        Ok(ConfigWatcher::new(config, sender, cancel))
    }

    #[cfg(feature = "github")]
    fn resolve_fetcher(&self) -> Result<Arc<dyn ContentFetcher>> {
        if let Some(fetcher) = &self.fetcher {
            return Ok(Arc::clone(fetcher));
        }
        match &self.token {
            Some(token) => {
                let fetcher = crate::sources::GithubFetcher::builder()
                    .with_token(token.clone())
                    .build()?;
                Ok(Arc::new(fetcher))
            }
            None => Err(missing_fetcher()),
        }
    }

    #[cfg(not(feature = "github"))]
    fn resolve_fetcher(&self) -> Result<Arc<dyn ContentFetcher>> {
        self.fetcher.clone().ok_or_else(missing_fetcher)
    }
}

fn missing_fetcher() -> WatcherError {
    WatcherError::Construction(
        "a content fetcher must be supplied with with_fetcher or with_token".to_string(),
    )
}

impl ConfigWatcher {
    /// Create a new builder for constructing a watcher.
    pub fn builder(config: Config) -> ConfigWatcherBuilder {
        ConfigWatcherBuilder::new(config)
    }
}
