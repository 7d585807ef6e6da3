//! Caching strategies.
//!
//! Every strategy resolves to a response. Only a network-level fetch
//! failure starts the recovery chain (store lookup, then fallback); HTTP
//! error statuses are returned to the caller untouched.

use std::sync::Arc;

use offgrid_core::{InterceptedRequest, ResponseEnvelope, StoreRole};

use super::{FallbackProvider, StoreManager, StrategyClass};
use crate::fetch::Fetcher;

#[derive(Clone)]
pub struct StrategyExecutor {
    stores: StoreManager,
    fetcher: Arc<dyn Fetcher>,
    fallback: FallbackProvider,
}

impl StrategyExecutor {
    pub fn new(stores: StoreManager, fetcher: Arc<dyn Fetcher>, fallback: FallbackProvider) -> Self {
        Self { stores, fetcher, fallback }
    }

    /// Run the strategy for `class`.
    pub async fn execute(&self, class: StrategyClass, request: &InterceptedRequest) -> ResponseEnvelope {
        match class {
            StrategyClass::Static => self.cache_first(request).await,
            StrategyClass::Image => self.network_first_persistent(request, StoreRole::Dynamic).await,
            StrategyClass::Generic => self.network_first(request).await,
        }
    }

    /// Serve from the static store; fetch and store in the background on a miss.
    pub async fn cache_first(&self, request: &InterceptedRequest) -> ResponseEnvelope {
        if let Some(cached) = self.lookup(StoreRole::Static, request).await {
            tracing::debug!(url = %request.url, "static store hit");
            return cached;
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store_detached(StoreRole::Static, request, &response);
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "fetch failed, serving fallback");
                self.fallback.respond(request).await
            }
        }
    }

    /// Fetch first; store successful non-opaque responses in the dynamic store.
    pub async fn network_first(&self, request: &InterceptedRequest) -> ResponseEnvelope {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() && !response.is_opaque() {
                    self.store(StoreRole::Dynamic, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "fetch failed, trying dynamic store");
                self.recover(StoreRole::Dynamic, request).await
            }
        }
    }

    /// Fetch first; store successful or opaque responses in `role`'s store.
    ///
    /// Opaque responses cannot be status-checked, so they are kept as-is.
    pub async fn network_first_persistent(&self, request: &InterceptedRequest, role: StoreRole) -> ResponseEnvelope {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() || response.is_opaque() {
                    self.store(role, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, store = role.suffix(), "fetch failed, trying store");
                self.recover(role, request).await
            }
        }
    }

    async fn recover(&self, role: StoreRole, request: &InterceptedRequest) -> ResponseEnvelope {
        match self.lookup(role, request).await {
            Some(cached) => cached,
            None => self.fallback.respond(request).await,
        }
    }

    /// Store lookup where store failures count as a miss.
    async fn lookup(&self, role: StoreRole, request: &InterceptedRequest) -> Option<ResponseEnvelope> {
        match self.stores.match_request(role, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "store lookup failed");
                None
            }
        }
    }

    async fn store(&self, role: StoreRole, request: &InterceptedRequest, response: &ResponseEnvelope) {
        if let Err(e) = self.stores.put(role, request, response).await {
            tracing::warn!(url = %request.url, error = %e, "store write failed");
        }
    }

    /// Store without waiting. The write may finish after the response has
    /// been handed back; failures are only logged.
    fn store_detached(&self, role: StoreRole, request: &InterceptedRequest, response: &ResponseEnvelope) {
        let stores = self.stores.clone();
        let request = request.clone();
        let response = response.clone();
        tokio::spawn(async move {
            if let Err(e) = stores.put(role, &request, &response).await {
                tracing::warn!(url = %request.url, error = %e, "background store write failed");
            }
        });
    }
}
