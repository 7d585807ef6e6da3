//! Interception engine for offgrid.
//!
//! This crate provides the network fetcher, request classification, caching
//! strategies and the lifecycle/messaging signal handlers shared by the
//! server.

pub mod fetch;
pub mod host;
pub mod intercept;
pub mod signals;

#[cfg(test)]
mod testing;

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use host::{Host, NoopSync, Notification, NotificationData, SyncRoutine};
pub use intercept::{
    Classifier, FallbackProvider, OFFLINE_MESSAGE, ProvisionFailure, ProvisionReport, StoreManager, StrategyClass,
    StrategyExecutor,
};
pub use signals::{ActivateOutcome, FetchOutcome, InstallOutcome, ServiceWorker};
