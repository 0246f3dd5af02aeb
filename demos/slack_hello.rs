//! Reads a "hello" command's settings from GitHub and follows its changes.
//!
//! Expects `config/slack/hello.yml` (or `.yaml` / `.json`) in the repository:
//!
//! ```yaml
//! message: Hello!
//! ```
//!
//! Run with `GITHUB_TOKEN=... cargo run --example slack_hello`.

use github_config_watcher::prelude::*;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct HelloConfig {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("github_config_watcher=debug".parse().unwrap()),
        )
        .init();

    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| WatcherError::Construction("GITHUB_TOKEN is not set".to_string()))?;

    let config = Config::new("oklahomer", "go-sarah-githubconfig-example", "config")
        .with_interval(Duration::from_secs(30));

    let shutdown = CancellationToken::new();
    let watcher = ConfigWatcher::builder(config)
        .with_token(token)
        .with_cancellation(shutdown.clone())
        .build()?;

    let hello: HelloConfig = watcher.read("slack", "hello").await?;
    println!("current message: {}", hello.message);

    let reader = watcher.clone();
    watcher
        .watch("slack", "hello", move || {
            let reader = reader.clone();
            async move {
                match reader.read::<HelloConfig>("slack", "hello").await {
                    Ok(hello) => println!("message updated: {}", hello.message),
                    Err(e) => eprintln!("failed to reload hello: {}", e),
                }
            }
        })
        .await?;

    println!("watching for changes, press Ctrl-C to stop");
    let _ = tokio::signal::ctrl_c().await;
    shutdown.cancel();
    println!("Finished");
    Ok(())
}
