//! MCP tool implementations.
//!
//! Each tool is one inbound signal from the host runtime, plus read-only
//! store inspection.
#![allow(unused_imports)]

pub mod fetch;
pub mod lifecycle;
pub mod messaging;
pub mod store;

use std::collections::BTreeMap;

use offgrid_core::{ResponseEnvelope, ResponseKind};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

pub use fetch::{FetchOutput, FetchParams};
pub use lifecycle::{ActivateOutput, InstallOutput};
pub use messaging::{NotificationClickParams, PushParams, SyncParams};
pub use store::{StoreGetParams, StoreListOutput};

/// A response as returned to the host.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    /// Final URL (empty for synthetic responses).
    pub url: String,
    /// HTTP status; 0 for opaque responses.
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    pub headers: BTreeMap<String, String>,
    /// Body as text when it is valid UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    /// Body as hex otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_hex: Option<String>,
}

impl From<ResponseEnvelope> for ResponseView {
    fn from(response: ResponseEnvelope) -> Self {
        let (body_text, body_hex) = match String::from_utf8(response.body) {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(hex::encode(e.into_bytes()))),
        };

        Self {
            url: response.url,
            status: response.status,
            status_text: response.status_text,
            kind: response.kind,
            headers: response.headers,
            body_text,
            body_hex,
        }
    }
}

/// Serialize tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| ToolError::Serialize(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use offgrid_client::{Fetcher, ServiceWorker};
    use offgrid_core::{AppConfig, Error, InterceptedRequest, ResponseEnvelope, StoreDb};
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;

    use crate::host::LogHost;

    /// Fetcher keyed by the request URL exactly as given.
    #[derive(Default)]
    pub struct MapFetcher(pub HashMap<String, ResponseEnvelope>);

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseEnvelope, Error> {
            self.0
                .get(&request.url)
                .cloned()
                .ok_or_else(|| Error::Network(format!("connection refused: {}", request.url)))
        }
    }

    pub async fn worker(fetcher: MapFetcher) -> Arc<ServiceWorker> {
        let db = StoreDb::open_in_memory().await.unwrap();
        let config = AppConfig { static_assets: vec!["./index.html".to_string()], ..AppConfig::default() };
        Arc::new(ServiceWorker::new(Arc::new(config), db, Arc::new(fetcher), Arc::new(LogHost)).unwrap())
    }

    pub fn html(body: &str) -> ResponseEnvelope {
        ResponseEnvelope::synthetic(200, "OK", "text/html", body)
    }

    /// Parse the JSON text content of a tool result.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_view_text_body() {
        let view = ResponseView::from(ResponseEnvelope::synthetic(503, "Service Unavailable", "text/plain", "offline"));
        assert_eq!(view.body_text.as_deref(), Some("offline"));
        assert!(view.body_hex.is_none());
        assert_eq!(view.kind, ResponseKind::Synthetic);
    }

    #[test]
    fn test_response_view_binary_body() {
        let view = ResponseView::from(ResponseEnvelope::opaque("https://images.unsplash.com/a", vec![0xff, 0xd8, 0xff]));
        assert!(view.body_text.is_none());
        assert_eq!(view.body_hex.as_deref(), Some("ffd8ff"));
        assert_eq!(view.status, 0);
    }
}
