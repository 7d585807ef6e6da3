//! Last-resort responses for requests that neither the network nor the
//! stores could satisfy.

use offgrid_core::{InterceptedRequest, ResponseEnvelope, StoreRole};

use super::StoreManager;

/// Body of the synthesized offline response.
pub const OFFLINE_MESSAGE: &str = "Offline — Please connect to the internet.";

/// The fixed 503 plain-text response.
pub fn offline_response() -> ResponseEnvelope {
    ResponseEnvelope::synthetic(503, "Service Unavailable", "text/plain", OFFLINE_MESSAGE)
}

#[derive(Clone, Debug)]
pub struct FallbackProvider {
    stores: StoreManager,
    root_document: String,
}

impl FallbackProvider {
    pub fn new(stores: StoreManager, root_document: impl Into<String>) -> Self {
        Self { stores, root_document: root_document.into() }
    }

    /// Produce a substitute response. Never fails.
    ///
    /// Page requests get the root document from the static store, exactly as
    /// stored. Everything else, and page requests when the root document is
    /// unavailable, get [`offline_response`].
    pub async fn respond(&self, request: &InterceptedRequest) -> ResponseEnvelope {
        if request.accepts_document() {
            let root = InterceptedRequest::get(self.root_document.as_str());
            match self.stores.match_request(StoreRole::Static, &root).await {
                Ok(Some(document)) => {
                    tracing::debug!(url = %request.url, "serving cached root document offline");
                    return document;
                }
                Ok(None) => {
                    tracing::warn!(root = %self.root_document, "root document missing from static store");
                }
                Err(e) => {
                    tracing::warn!(root = %self.root_document, error = %e, "root document lookup failed");
                }
            }
        }

        offline_response()
    }
}
