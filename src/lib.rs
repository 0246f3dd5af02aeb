//! # github-config-watcher
//!
//! Live configuration for chat bots, stored in a GitHub repository.
//!
//! ## Overview
//!
//! `github-config-watcher` reads per-bot configuration files from a
//! directory tree in a GitHub repository and keeps them fresh without a
//! process restart:
//! - Typed, on-demand reads served from a local cache
//! - Periodic polling that detects changed files by their git blob id
//! - Change callbacks so commands can rebuild themselves
//! - YAML and JSON content
//!
//! Files for a bot type live under `{base_dir}/{bot_type}/{id}.{yml,yaml,json}`
//! on the configured branch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use github_config_watcher::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct HelloConfig {
//!     message: String,
//! }
//!
//! # async fn example() -> github_config_watcher::error::Result<()> {
//! let config = Config::new("oklahomer", "go-sarah-githubconfig-example", "config");
//! let watcher = ConfigWatcher::builder(config)
//!     .with_token(std::env::var("GITHUB_TOKEN").unwrap_or_default())
//!     .build()?;
//!
//! // Reads config/slack/hello.yml (or .yaml / .json) on branch master
//! let hello: HelloConfig = watcher.read("slack", "hello").await?;
//! println!("{}", hello.message);
//!
//! // Get told when that file changes
//! watcher
//!     .watch("slack", "hello", || async { println!("hello changed") })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency
//!
//! Observed configuration can be stale by up to one polling interval. A
//! slow fetch delays every other read until it completes.
//!
//! ## Feature Flags
//!
//! - `github` (default): [`sources::GithubFetcher`] and
//!   [`ConfigWatcherBuilder::with_token`](core::ConfigWatcherBuilder::with_token).
//!   Without it, supply your own [`sources::ContentFetcher`].

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod decode;
pub mod error;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        BotType, Config, ConfigWatcher, ConfigWatcherBuilder, File, FileSet, Namespace,
    };
    pub use crate::error::{Result, WatcherError};
    pub use crate::sources::ContentFetcher;

    #[cfg(feature = "github")]
    pub use crate::sources::GithubFetcher;
}
