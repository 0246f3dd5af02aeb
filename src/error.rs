//! Error types for github-config-watcher.

use crate::core::BotType;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur when reading or watching live configuration.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// The watcher did not answer a read within the configured timeout.
    ///
    /// The request may still be processed; the outcome is unknown and the
    /// read is safe to retry.
    #[error("timeout")]
    Timeout,

    /// The requested id is absent from the bot type's current file set.
    #[error("config not found: bot_type={bot_type} id={id}")]
    ConfigNotFound {
        /// Namespace the lookup was made in
        bot_type: BotType,
        /// Configuration key that was requested
        id: String,
    },

    /// The content fetcher failed to list the remote directory.
    #[error("Failed to fetch configuration: {0}")]
    Fetch(String),

    /// The file content could not be decoded into the requested type.
    #[error("Failed to decode configuration for {id}: {message}")]
    Decode {
        /// Configuration key of the file
        id: String,
        /// Underlying parser message
        message: String,
    },

    /// No decoder is registered for the file's extension.
    #[error("unsupported file extension for {id}: {extension}")]
    UnsupportedExtension {
        /// Configuration key of the file
        id: String,
        /// Extension including the leading dot, possibly empty
        extension: String,
    },

    /// The watcher could not be constructed.
    #[error("Failed to construct watcher: {0}")]
    Construction(String),

    /// The watcher's own settings could not be loaded.
    #[error("Failed to load watcher settings: {0}")]
    Config(String),

    /// The watcher has been cancelled and no longer accepts messages.
    #[error("watcher is stopped")]
    Stopped,
}

impl WatcherError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Fetch(_))
    }
}

impl From<config::ConfigError> for WatcherError {
    fn from(err: config::ConfigError) -> Self {
        WatcherError::Config(err.to_string())
    }
}
