//! Shared test doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use github_config_watcher::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory fetcher whose directory listings can be swapped between polls.
#[derive(Default)]
pub struct ScriptedFetcher {
    trees: Mutex<HashMap<String, FileSet>>,
    failing: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Namespace>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listing of `path` with a single file.
    pub fn put(&self, path: &str, file_name: &str, object_id: &str, content: &str) {
        let file = File::from_entry(file_name, object_id, content);
        let mut trees = self.trees.lock().unwrap();
        let tree = trees.entry(path.to_string()).or_default();
        tree.insert(file.id.clone(), file);
    }

    /// Make every subsequent fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Make every subsequent fetch take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn namespaces(&self) -> Vec<Namespace> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, namespace: &Namespace) -> Result<FileSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(namespace.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.lock().unwrap() {
            return Err(WatcherError::Fetch("remote unavailable".to_string()));
        }

        Ok(self
            .trees
            .lock()
            .unwrap()
            .get(&namespace.path)
            .cloned()
            .unwrap_or_default())
    }
}
