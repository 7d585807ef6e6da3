//! sync, push and notification_click tool implementations.

use offgrid_client::{Notification, ServiceWorker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Deferred-sync tag, e.g. "sync-contact".
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutput {
    pub tag: String,
    /// Whether the tag matched and the synchronization routine ran.
    pub triggered: bool,
}

/// Parameters for the push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Raw push message data: a JSON object with optional `title`, `body`
    /// and `url`. Omit for a push without data.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushOutput {
    pub shown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// The notification that was clicked, as returned by push.
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickOutput {
    /// Window target that was focused or opened.
    pub opened: String,
}

/// Implementation of the sync tool.
pub async fn sync_impl(worker: &ServiceWorker, params: SyncParams) -> Result<CallToolResult, McpError> {
    if params.tag.is_empty() {
        return Err(ToolError::InvalidInput("tag cannot be empty".into()).into());
    }

    let triggered = worker.on_sync(&params.tag).await?;
    json_result(&SyncOutput { tag: params.tag, triggered })
}

/// Implementation of the push tool.
pub async fn push_impl(worker: &ServiceWorker, params: PushParams) -> Result<CallToolResult, McpError> {
    let notification = worker.on_push(params.payload.as_deref()).await;
    json_result(&PushOutput { shown: notification.is_some(), notification })
}

/// Implementation of the notification_click tool.
pub async fn notification_click_impl(
    worker: &ServiceWorker, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let opened = worker.on_notification_click(&params.notification).await;
    json_result(&NotificationClickOutput { opened })
}
