//! Core watcher types: settings, the watcher actor and its handle.

mod builder;
mod config;
mod types;
mod watcher;

pub use builder::ConfigWatcherBuilder;
pub use self::config::{Config, DEFAULT_BRANCH, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
pub use types::{BotType, File, FileSet, Namespace};
pub use watcher::{Callback, ConfigWatcher};
