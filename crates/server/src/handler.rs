//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to
//! the engine's signal handlers.
use std::sync::Arc;

use offgrid_client::ServiceWorker;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::{
    FetchParams, NotificationClickParams, PushParams, StoreGetParams, SyncParams, fetch::fetch_impl, lifecycle,
    messaging, store,
};

/// The main MCP server handler for offgrid.
#[derive(Clone)]
pub struct OffgridServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<ServiceWorker>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl OffgridServer {
    pub fn new(worker: Arc<ServiceWorker>) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    #[tool(description = "Setup signal. Pre-caches the configured static assets into the current static store \
                          and requests skip-waiting. Reports stored and failed assets.")]
    async fn install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.worker).await
    }

    #[tool(description = "Activation signal. Deletes every store not named for the current version tag and \
                          claims open clients.")]
    async fn activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.worker).await
    }

    /// Intercept a request.
    ///
    /// Non-GET requests and extension URLs come back as `{"bypass": true}`.
    /// Everything else is classified and answered by its caching strategy;
    /// the response is never an error, at worst the 503 offline response.
    #[tool(description = "Request signal. Classifies the request (static, image, generic) and answers it with the \
                          matching caching strategy, or reports bypass for requests that are not intercepted.")]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deferred-sync signal. Runs the synchronization routine when the tag matches.")]
    async fn sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        messaging::sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Push signal. Builds a notification from an optional JSON payload {title, body, url}, \
                          filling missing fields with defaults, and shows it.")]
    async fn push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        messaging::push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Notification interaction signal. Closes the notification and focuses or opens a window \
                          at its URL (default: application root).")]
    async fn notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        messaging::notification_click_impl(&self.worker, params.0).await
    }

    #[tool(description = "List every named store with its entry count and whether it belongs to the current version.")]
    async fn store_list(&self) -> Result<CallToolResult, McpError> {
        store::list_impl(&self.worker).await
    }

    #[tool(description = "Look up one request URL in a store, by role (static/dynamic) or exact store name.")]
    async fn store_get(&self, params: Parameters<StoreGetParams>) -> Result<CallToolResult, McpError> {
        store::get_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for OffgridServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offgrid".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline request-interception engine. Drive it with install, activate and fetch; \
                 inspect stores with store_list and store_get."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
