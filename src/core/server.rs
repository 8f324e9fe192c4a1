//! MCP Server implementation and lifecycle management.
//!
//! `McpServer` is the merged parent server. It is assembled by
//! [`McpServer::build`], which imports the Jira and Xray sub-servers under
//! the shared prefix and runs the startup hook; only then is it handed to a
//! transport. Both transports funnel tool calls through
//! [`McpServer::invoke`], where failures are turned into caller-facing
//! results according to the masking policy.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::*,
    service::RequestContext,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::error::{Error, Result};
use super::masking::ErrorMasking;
use crate::domains::tools::{
    TOOL_PREFIX, ToolFailure, ToolRegistry,
    definitions::{jira_server, xray_server},
};

const INSTRUCTIONS: &str = "Fabric MCP gateway. Use pss_fabric_get_jira_issue to fetch Jira issues \
     and pss_fabric_get_xray_test_case to fetch Xray test cases by key.";

/// The merged MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Frozen registry of prefixed tools.
    registry: Arc<ToolRegistry>,

    /// Masking policy for unexpected failures.
    masking: ErrorMasking,
}

impl McpServer {
    /// Wrap an already populated registry.
    pub fn new(config: Arc<Config>, registry: ToolRegistry) -> Self {
        let masking = ErrorMasking::from_config(&config);
        Self {
            config,
            registry: Arc::new(registry),
            masking,
        }
    }

    /// Import both sub-servers, then run the startup hook.
    ///
    /// Runs before any listener exists, so no request can observe a
    /// partially registered tool set.
    pub fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let mut registry = ToolRegistry::new();
        registry.import_server(jira_server(&config)?, Some(TOOL_PREFIX))?;
        registry.import_server(xray_server(&config)?, Some(TOOL_PREFIX))?;
        if registry.is_empty() {
            return Err(Error::registration("no tools registered"));
        }

        let server = Self::new(config, registry);
        server.on_startup();
        Ok(server)
    }

    /// Startup hook of the merged server.
    pub fn on_startup(&self) {
        info!(
            "{} ready with {} tool(s): {}",
            self.name(),
            self.registry.len(),
            self.registry.tool_names().join(", ")
        );
        if self.masking.masks_details() {
            info!("Error details are masked ({} mode)", self.config.environment);
        }
    }

    /// Shutdown hook, run after the transport has stopped.
    pub fn on_shutdown(&self) {
        info!("{} stopped", self.name());
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn masking(&self) -> ErrorMasking {
        self.masking
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// All registered tools (prefixed).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list_tools()
    }

    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Call a tool by its public name.
    ///
    /// Tool faults become `isError` results: classified faults carry their
    /// message, unclassified ones go through the masking policy. Protocol
    /// problems (unknown tool, bad arguments) become JSON-RPC errors.
    #[instrument(skip(self, arguments))]
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let arguments = arguments.unwrap_or_default();

        match self.registry.call_tool(name, arguments).await {
            Ok(value) => Ok(success_result(value)),
            Err(ToolFailure::Tool(err)) => {
                Ok(CallToolResult::error(vec![Content::text(err.message())]))
            }
            // Already logged where it was raised.
            Err(ToolFailure::Unexpected(err)) => {
                let message = self.masking.tool_error_message(name, &err);
                Ok(CallToolResult::error(vec![Content::text(message)]))
            }
            Err(ToolFailure::InvalidArguments(msg)) => Err(McpError::invalid_params(
                format!("Invalid arguments for tool '{}': {}", name, msg),
                None,
            )),
            Err(ToolFailure::NotFound(tool)) => Err(McpError::invalid_params(
                format!("Unknown tool: {}", tool),
                None,
            )),
        }
    }
}

/// Successful call: JSON text for older clients plus structured content.
fn success_result(value: Value) -> CallToolResult {
    let mut result = CallToolResult::success(vec![Content::text(value.to_string())]);
    result.structured_content = Some(value);
    result
}

/// ServerHandler implementation used by the STDIO transport.
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        self.invoke(&request.name, request.arguments).await
    }
}
