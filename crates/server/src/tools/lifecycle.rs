//! install and activate tool implementations.
//!
//! Setup provisions the static store; activation reclaims stores from
//! earlier version tags.

use offgrid_client::{ActivateOutcome, InstallOutcome, ServiceWorker};
use offgrid_core::StoreRole;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Output from the install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutput {
    /// Static store that was provisioned.
    pub store: String,
    /// Assets now held in the static store.
    pub stored: Vec<String>,
    /// Assets that could not be fetched or stored, with the reason.
    pub failed: Vec<FailedAsset>,
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FailedAsset {
    pub url: String,
    pub reason: String,
}

/// Output from the activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateOutput {
    /// Stores deleted during activation.
    pub deleted: Vec<String>,
    pub claimed: bool,
}

/// Implementation of the install tool.
pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let InstallOutcome { report, skip_waiting } = worker.on_install().await?;

    let output = InstallOutput {
        store: worker.stores().names().name(StoreRole::Static).to_string(),
        stored: report.stored,
        failed: report
            .failed
            .into_iter()
            .map(|f| FailedAsset { url: f.url, reason: f.reason })
            .collect(),
        skip_waiting,
    };
    json_result(&output)
}

/// Implementation of the activate tool.
pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let ActivateOutcome { deleted, claimed } = worker.on_activate().await?;
    json_result(&ActivateOutput { deleted, claimed })
}
