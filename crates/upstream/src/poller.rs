//! Periodic refresh of one chat channel.
//!
//! The chat server's push channel is not used; instead [`ChannelPoller`]
//! re-reads the newest posts on a fixed interval and publishes them on a
//! [`watch`] channel. A fetch is always awaited before the next tick is
//! taken, and ticks that fall due during a fetch are skipped rather than
//! queued, so at most one request per channel is in flight. Subscribers can
//! therefore see data up to [`ChannelPoller::staleness_bound`] old.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use syncup_core::chat::{display_name, normalize_posts, short_id, ChatMessage, UNKNOWN_USER};
use syncup_core::types::Timestamp;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::UpstreamError;
use crate::mattermost::{MattermostApi, DEFAULT_POST_LIMIT};

/// Default refresh interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where the poller reads posts and user records from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn channel_posts(&self, channel_id: &str, limit: u32) -> Result<Value, UpstreamError>;
    async fn user(&self, user_id: &str) -> Result<Value, UpstreamError>;
}

#[async_trait]
impl MessageSource for MattermostApi {
    async fn channel_posts(&self, channel_id: &str, limit: u32) -> Result<Value, UpstreamError> {
        MattermostApi::channel_posts(self, channel_id, limit).await
    }

    async fn user(&self, user_id: &str) -> Result<Value, UpstreamError> {
        MattermostApi::user(self, user_id).await
    }
}

// ---------------------------------------------------------------------------
// UserDirectory
// ---------------------------------------------------------------------------

/// Cache of user id -> display name.
///
/// A lookup that fails caches the id itself, so a broken user record is
/// requested once and not on every refresh.
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&str> {
        self.names.get(user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cached name, or the shortened id while it is unresolved.
    pub fn label(&self, user_id: &str) -> String {
        self.get(user_id)
            .map(String::from)
            .unwrap_or_else(|| short_id(user_id))
    }

    /// Look up every author in `messages` not yet in the cache. Lookups run
    /// concurrently. Returns how many ids were added.
    pub async fn resolve_missing(
        &mut self,
        source: &dyn MessageSource,
        messages: &[ChatMessage],
    ) -> usize {
        let mut seen = HashSet::new();
        let missing: Vec<&str> = messages
            .iter()
            .map(|m| m.user_id.as_str())
            .filter(|id| *id != UNKNOWN_USER && !self.names.contains_key(*id))
            .filter(|id| seen.insert(*id))
            .collect();

        if missing.is_empty() {
            return 0;
        }

        let lookups = missing.iter().map(|id| source.user(id));
        let results = futures::future::join_all(lookups).await;

        for (id, result) in missing.iter().zip(results) {
            let name = match result {
                Ok(user) => display_name(&user, id),
                Err(e) => {
                    tracing::debug!(user_id = %id, error = %e, "User lookup failed, showing id");
                    id.to_string()
                }
            };
            self.names.insert(id.to_string(), name);
        }
        missing.len()
    }

    /// Fill in `username` on messages that arrived without one.
    pub fn annotate(&self, messages: &mut [ChatMessage]) {
        for message in messages.iter_mut().filter(|m| m.username.is_none()) {
            message.username = self.get(&message.user_id).map(String::from);
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelPoller
// ---------------------------------------------------------------------------

/// The latest view of a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub messages: Vec<ChatMessage>,
    pub fetched_at: Timestamp,
}

pub struct ChannelPoller {
    source: Arc<dyn MessageSource>,
    channel_id: String,
    limit: u32,
    interval: Duration,
    directory: UserDirectory,
    tx: watch::Sender<Option<ChannelSnapshot>>,
}

impl ChannelPoller {
    /// Create a poller and the receiver its snapshots are published on. The
    /// receiver holds `None` until the first successful fetch.
    pub fn new(
        source: Arc<dyn MessageSource>,
        channel_id: impl Into<String>,
    ) -> (Self, watch::Receiver<Option<ChannelSnapshot>>) {
        let (tx, rx) = watch::channel(None);
        let poller = Self {
            source,
            channel_id: channel_id.into(),
            limit: DEFAULT_POST_LIMIT,
            interval: DEFAULT_POLL_INTERVAL,
            directory: UserDirectory::new(),
            tx,
        };
        (poller, rx)
    }

    /// `interval` must be non-zero; the server checks this at startup.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Longest time a subscriber may look at data older than the channel:
    /// one interval plus one request.
    pub fn staleness_bound(&self, request_timeout: Duration) -> Duration {
        self.interval + request_timeout
    }

    /// Fetch, normalize and publish once. Returns the number of messages.
    ///
    /// On error nothing is published and the previous snapshot stays.
    pub async fn poll_once(&mut self) -> Result<usize, UpstreamError> {
        let raw = self
            .source
            .channel_posts(&self.channel_id, self.limit)
            .await?;
        let mut messages = normalize_posts(&raw);

        self.directory
            .resolve_missing(self.source.as_ref(), &messages)
            .await;
        self.directory.annotate(&mut messages);

        let count = messages.len();
        self.tx.send_replace(Some(ChannelSnapshot {
            channel_id: self.channel_id.clone(),
            messages,
            fetched_at: Utc::now(),
        }));
        Ok(count)
    }

    /// Poll until `cancel` is triggered. The first fetch happens immediately.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            channel_id = %self.channel_id,
            interval_ms = self.interval.as_millis() as u64,
            "Channel poller started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = self.poll_once() => match result {
                            Ok(count) => {
                                tracing::debug!(channel_id = %self.channel_id, count, "Channel refreshed");
                            }
                            Err(e) => {
                                tracing::warn!(channel_id = %self.channel_id, error = %e, "Channel refresh failed");
                            }
                        },
                    }
                }
            }
        }

        tracing::info!(channel_id = %self.channel_id, "Channel poller stopping");
    }
}
