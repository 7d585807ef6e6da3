//! fetch tool implementation.
//!
//! Hands one intercepted request to the engine and returns either a bypass
//! marker or the strategy class and the response it produced.

use std::collections::BTreeMap;

use offgrid_client::{FetchOutcome, ServiceWorker, StrategyClass};
use offgrid_core::{InterceptedRequest, RequestMode};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ResponseView, json_result};
use crate::error::ToolError;

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Request URL, relative to the application origin or absolute.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers, e.g. `{"accept": "text/html"}`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request mode: "cors" (default), "no-cors", "same-origin" or "navigate".
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

impl FetchParams {
    fn into_request(self) -> InterceptedRequest {
        let mut request = InterceptedRequest::get(self.url).with_method(self.method).with_mode(self.mode);
        for (name, value) in self.headers {
            request = request.with_header(name, value);
        }
        request
    }
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// True when the request was not intercepted and the host should
    /// perform it itself.
    pub bypass: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<StrategyClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseView>,
}

/// Implementation of the fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: FetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let request = params.into_request();
    let output = match worker.on_fetch(&request).await {
        FetchOutcome::Bypass => FetchOutput { bypass: true, class: None, response: None },
        FetchOutcome::Respond { class, response } => {
            FetchOutput { bypass: false, class: Some(class), response: Some(response.into()) }
        }
    };

    json_result(&output)
}
