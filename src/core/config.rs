//! Static watcher settings.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default branch the configuration tree is read from.
pub const DEFAULT_BRANCH: &str = "master";

/// Default polling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default time a read waits for the watcher to answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Watcher settings, immutable once the watcher is built.
///
/// Configuration files for a bot type live under
/// `{base_dir}/{bot_type}/` on `branch` of `owner/name`.
///
/// # Examples
///
/// ```rust
/// use github_config_watcher::prelude::*;
/// use std::time::Duration;
///
/// let config = Config::new("oklahomer", "go-sarah-githubconfig-example", "config")
///     .with_interval(Duration::from_secs(30));
/// assert_eq!(config.branch, "master");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Directory holding one sub-directory per bot type
    pub base_dir: String,
    /// Branch to read from
    pub branch: String,
    /// Polling interval for change detection
    #[serde(rename = "interval_ms", with = "millis")]
    pub interval: Duration,
    /// Read timeout
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
}

impl Config {
    /// Create settings with default branch, interval and timeout.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        base_dir: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Set the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load settings from a YAML, TOML or JSON file, overlaid by environment
    /// variables named `{env_prefix}_{FIELD}` (e.g. `WATCHER_BRANCH`).
    ///
    /// Missing fields fall back to the defaults of [`Config::new`].
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Config`](crate::error::WatcherError::Config) if
    /// the file cannot be read or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>, env_prefix: &str) -> Result<Self> {
        let loaded = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(true))
            .add_source(config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;

        Ok(loaded.try_deserialize::<Self>()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: String::new(),
            name: String::new(),
            base_dir: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Serialize a [`Duration`] as whole milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
