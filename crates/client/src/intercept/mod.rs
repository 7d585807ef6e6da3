//! Request interception: classification, caching strategies, fallback
//! responses and store management.

pub mod classify;
pub mod fallback;
pub mod manager;
pub mod strategy;

pub use classify::{Classifier, StrategyClass};
pub use fallback::{FallbackProvider, OFFLINE_MESSAGE, offline_response};
pub use manager::{ProvisionFailure, ProvisionReport, StoreManager};
pub use strategy::StrategyExecutor;
