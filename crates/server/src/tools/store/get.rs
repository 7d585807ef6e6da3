//! store_get tool implementation.
//!
//! Looks up one request in one named store.

use offgrid_client::ServiceWorker;
use offgrid_core::{InterceptedRequest, StoreRole};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tools::{ResponseView, json_result};

/// Parameters for the store_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreGetParams {
    /// Request URL, relative to the application origin or absolute.
    pub url: String,

    /// Current store to search: "static" or "dynamic". Ignored when
    /// `store` is given.
    #[serde(default)]
    pub role: Option<StoreRole>,

    /// Exact store name, for inspecting stores of other version tags.
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the store_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreGetOutput {
    pub store: String,
    pub response: ResponseView,
}

/// Implementation of the store_get tool.
pub async fn get_impl(worker: &ServiceWorker, params: StoreGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let store = match (params.store, params.role) {
        (Some(name), _) if !name.is_empty() => name,
        (_, Some(role)) => worker.stores().names().name(role).to_string(),
        _ => return Err(ToolError::InvalidInput("one of store or role must be specified".into()).into()),
    };

    let request = InterceptedRequest::get(params.url.as_str());
    let response = worker
        .stores()
        .match_in(&store, &request)
        .await?
        .ok_or_else(|| ToolError::NotFound(format!("{} not in {store}", params.url)))?;

    json_result(&StoreGetOutput { store, response: response.into() })
}
