//! Capabilities the embedding runtime provides to the engine.
//!
//! The engine never talks to windows or the notification tray itself; it asks
//! the [`Host`] to. Deferred synchronization is delegated to a
//! [`SyncRoutine`].

use async_trait::async_trait;
use offgrid_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Data attached to a notification and returned when it is clicked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationData {
    /// Target opened on click.
    #[serde(default)]
    pub url: Option<String>,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub data: NotificationData,
}

#[async_trait]
pub trait Host: Send + Sync {
    /// Let a freshly installed version take over without waiting for
    /// existing clients to go away.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open client.
    async fn claim_clients(&self) -> Result<(), Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, notification: &Notification) -> Result<(), Error>;

    /// Focus a client already showing `url`, or open a new one.
    async fn focus_or_open_window(&self, url: &str) -> Result<(), Error>;
}

/// Work run when a deferred-sync signal carries the configured tag.
#[async_trait]
pub trait SyncRoutine: Send + Sync {
    async fn synchronize(&self, tag: &str) -> Result<(), Error>;
}

/// Sync routine with nothing to send yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSync;

#[async_trait]
impl SyncRoutine for NoopSync {
    async fn synchronize(&self, tag: &str) -> Result<(), Error> {
        tracing::info!(tag, "background sync triggered");
        Ok(())
    }
}
