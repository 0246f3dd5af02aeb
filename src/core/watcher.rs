//! The watcher actor and the handle callers talk to it through.
//!
//! One task owns the file cache and the subscription table. Reads,
//! subscription changes and periodic reconciliation all reach it as events
//! and are applied one at a time, so neither table needs a lock.

use crate::core::{BotType, Config, File, FileSet, Namespace};
use crate::decode::decode;
use crate::error::{Result, WatcherError};
use crate::sources::ContentFetcher;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Change notification registered through [`ConfigWatcher::watch`].
pub type Callback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Hands the looked-up file (or the lookup error) back to a waiting reader.
type Responder = Box<dyn FnOnce(Result<&File>) + Send>;

pub(crate) enum Message {
    Subscribe {
        bot_type: BotType,
        id: String,
        callback: Callback,
    },
    Unsubscribe(BotType),
    Read {
        bot_type: BotType,
        id: String,
        respond: Responder,
    },
}

/// Handle to a running watcher.
///
/// Cloning is cheap; every clone talks to the same watcher task.
///
/// # Examples
///
/// ```rust,no_run
/// use github_config_watcher::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Hello {
///     message: String,
/// }
///
/// # async fn example() -> Result<()> {
/// let config = Config::new("oklahomer", "go-sarah-githubconfig-example", "config");
/// let watcher = ConfigWatcher::builder(config)
///     .with_token("ghp_secret")
///     .build()?;
///
/// let hello: Hello = watcher.read("slack", "hello").await?;
/// println!("{}", hello.message);
///
/// let reader = watcher.clone();
/// watcher
///     .watch("slack", "hello", move || {
///         let reader = reader.clone();
///         async move {
///             if let Ok(hello) = reader.read::<Hello>("slack", "hello").await {
///                 println!("updated: {}", hello.message);
///             }
///         }
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConfigWatcher {
    config: Arc<Config>,
    sender: mpsc::Sender<Message>,
    cancel: CancellationToken,
}

impl ConfigWatcher {
    pub(crate) fn new(
        config: Arc<Config>,
        sender: mpsc::Sender<Message>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            sender,
            cancel,
        }
    }

    /// Read the configuration `id` of `bot_type`, decoded by its file extension.
    ///
    /// The first read of a bot type fetches its directory; later reads are
    /// served from the cache, which periodic reconciliation keeps current for
    /// watched bot types.
    ///
    /// # Errors
    ///
    /// - [`WatcherError::Timeout`] if no answer arrives within
    ///   [`Config::timeout`]. The request is not retracted; retrying is safe.
    /// - [`WatcherError::ConfigNotFound`] if no file with that id exists
    /// - [`WatcherError::Fetch`] if the directory had to be fetched and failed
    /// - [`WatcherError::Decode`] / [`WatcherError::UnsupportedExtension`]
    /// - [`WatcherError::Stopped`] if the watcher had already stopped when the
    ///   request was sent. A request still queued when it stops times out.
    pub async fn read<T>(&self, bot_type: impl Into<BotType>, id: impl Into<String>) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let message = Message::Read {
            bot_type: bot_type.into(),
            id: id.into(),
            respond: Box::new(move |found: Result<&File>| {
                // The reader may have timed out and gone away.
                let _ = tx.send(found.and_then(decode::<T>));
            }),
        };

        let exchange = async {
            self.sender
                .send(message)
                .await
                .map_err(|_| WatcherError::Stopped)?;
            match rx.await {
                Ok(result) => result,
                // Dropped unanswered at shutdown; the caller sees a timeout.
                Err(_) => std::future::pending().await,
            }
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(WatcherError::Timeout),
        }
    }

    /// Register `callback` to run whenever configuration `id` of `bot_type`
    /// changes remotely.
    ///
    /// Replaces any callback previously registered for the same pair. Returns
    /// once the registration is queued, not once it is applied.
    ///
    /// Each notification runs as its own task, so the callback may call
    /// [`read`](Self::read). Notifications for consecutive changes may overlap.
    ///
    /// If the bot type has not been read yet, the first poll finds no cached
    /// predecessor and notifies once for every watched id that exists.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Stopped`] once the watcher is cancelled.
    pub async fn watch<F, Fut>(
        &self,
        bot_type: impl Into<BotType>,
        id: impl Into<String>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback = Arc::new(move || callback().boxed());
        self.send(Message::Subscribe {
            bot_type: bot_type.into(),
            id: id.into(),
            callback,
        })
        .await
    }

    /// Drop every subscription and the cached files of `bot_type`.
    ///
    /// The next read of that bot type fetches fresh content.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Stopped`] once the watcher is cancelled.
    pub async fn unwatch(&self, bot_type: impl Into<BotType>) -> Result<()> {
        self.send(Message::Unsubscribe(bot_type.into())).await
    }

    /// The settings this watcher was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the watcher task is still processing events.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Stop the watcher. Equivalent to cancelling the token it was built with.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    async fn send(&self, message: Message) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| WatcherError::Stopped)
    }
}

/// The event loop owning all cache and subscription state.
pub(crate) struct Actor {
    config: Arc<Config>,
    fetcher: Arc<dyn ContentFetcher>,
    inbox: mpsc::Receiver<Message>,
    cancel: CancellationToken,
    cache: HashMap<BotType, FileSet>,
    subscriptions: HashMap<BotType, HashMap<String, Callback>>,
}

impl Actor {
    pub(crate) fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn ContentFetcher>,
        inbox: mpsc::Receiver<Message>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            fetcher,
            inbox,
            cancel,
            cache: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }

    pub(crate) async fn run(mut self) {
        let period = self.config.interval;
        // First reconciliation happens one full period after start.
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            owner = %self.config.owner,
            name = %self.config.name,
            interval = ?period,
            "config watcher started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle(message).await,
                    // Every handle is gone.
                    None => break,
                },
                _ = ticker.tick() => self.reconcile().await,
            }
        }

        tracing::info!("config watcher stopped");
    }

    async fn handle(&mut self, message: Message) {
        match message {
            Message::Subscribe {
                bot_type,
                id,
                callback,
            } => {
                tracing::debug!(%bot_type, %id, "subscribed");
                self.subscriptions
                    .entry(bot_type)
                    .or_default()
                    .insert(id, callback);
            }

            Message::Unsubscribe(bot_type) => {
                tracing::debug!(%bot_type, "unsubscribed");
                self.cache.remove(&bot_type);
                self.subscriptions.remove(&bot_type);
            }

            Message::Read {
                bot_type,
                id,
                respond,
            } => {
                if !self.cache.contains_key(&bot_type) {
                    match self.fetch(&bot_type).await {
                        Ok(files) => {
                            tracing::debug!(%bot_type, files = files.len(), "cache filled");
                            self.cache.insert(bot_type.clone(), files);
                        }
                        Err(e) => {
                            // Leave the bot type uncached so the next read retries.
                            respond(Err(e));
                            return;
                        }
                    }
                }

                match self.cache.get(&bot_type).and_then(|files| files.get(&id)) {
                    Some(file) => respond(Ok(file)),
                    None => respond(Err(WatcherError::ConfigNotFound { bot_type, id })),
                }
            }
        }
    }

    /// Refetch every watched bot type and notify subscribers whose file
    /// changed since the cached snapshot.
    async fn reconcile(&mut self) {
        for (bot_type, subscribed) in &self.subscriptions {
            let files = match self.fetch(bot_type).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(%bot_type, error = %e, "skipping reconciliation");
                    continue;
                }
            };

            let previous = self.cache.get(bot_type);
            for (id, callback) in subscribed {
                let Some(file) = files.get(id) else {
                    continue;
                };
                let changed = previous
                    .and_then(|cached| cached.get(id))
                    .is_none_or(|old| old.object_id != file.object_id);
                if changed {
                    tracing::debug!(
                        %bot_type,
                        %id,
                        object_id = %file.object_id,
                        "dispatching change"
                    );
                    // Never run the callback here: it may read from this actor.
                    let callback = Arc::clone(callback);
                    tokio::spawn(async move { callback().await });
                }
            }

            self.cache.insert(bot_type.clone(), files);
        }
    }

    async fn fetch(&self, bot_type: &BotType) -> Result<FileSet> {
        let namespace = Namespace::new(
            self.config.owner.clone(),
            self.config.name.clone(),
            self.config.branch.clone(),
            &self.config.base_dir,
            bot_type,
        );
        self.fetcher.fetch(&namespace).await
    }
}
