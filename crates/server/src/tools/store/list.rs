//! store_list tool implementation.
//!
//! Lists every store with its entry count.

use offgrid_client::ServiceWorker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreListing {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
    /// Whether the name belongs to the current version tag.
    pub current: bool,
}

/// Output from the store_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreListOutput {
    pub version_tag: String,
    pub stores: Vec<StoreListing>,
}

/// Implementation of the store_list tool.
pub async fn list_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let names = worker.stores().names();
    let stores = worker
        .stores()
        .summaries()
        .await?
        .into_iter()
        .map(|summary| {
            let current = names.is_current(&summary.name);
            StoreListing { name: summary.name, created_at: summary.created_at, entries: summary.entries, current }
        })
        .collect();

    json_result(&StoreListOutput { version_tag: names.tag().to_string(), stores })
}
