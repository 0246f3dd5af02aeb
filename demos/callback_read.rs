//! Offline walkthrough of the watcher with an in-memory fetcher.
//!
//! A background task edits the "remote" file every few seconds; the change
//! callback reads the new value back through the watcher.
//!
//! Run with `cargo run --example callback_read`.

use async_trait::async_trait;
use github_config_watcher::prelude::*;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct HelloConfig {
    message: String,
}

/// A directory holding a single `hello.yml`.
struct MemoryFetcher {
    revision: Mutex<u32>,
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, namespace: &Namespace) -> Result<FileSet> {
        let revision = *self.revision.lock().unwrap();
        println!("  fetching {} (revision {})", namespace.expression(), revision);
        let file = File::from_entry(
            "hello.yml",
            format!("oid-{}", revision),
            format!("message: hello #{}", revision),
        );
        Ok(FileSet::from([(file.id.clone(), file)]))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Callback Read Example ===\n");

    let fetcher = Arc::new(MemoryFetcher {
        revision: Mutex::new(1),
    });
    let config = Config::new("local", "memory", "bot/config")
        .with_interval(Duration::from_secs(1))
        .with_timeout(Duration::from_millis(500));
    let watcher = ConfigWatcher::builder(config)
        .with_shared_fetcher(fetcher.clone())
        .build()?;

    let hello: HelloConfig = watcher.read("slack", "hello").await?;
    println!("initial: {}\n", hello.message);

    let reader = watcher.clone();
    watcher
        .watch("slack", "hello", move || {
            let reader = reader.clone();
            async move {
                if let Ok(hello) = reader.read::<HelloConfig>("slack", "hello").await {
                    println!("✓ callback read: {}", hello.message);
                }
            }
        })
        .await?;

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(3)).await;
        *fetcher.revision.lock().unwrap() += 1;
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    watcher.stop();
    println!("\n=== Example Complete ===");
    Ok(())
}
