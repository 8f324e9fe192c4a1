//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - Import of sub-servers under a shared prefix
//! - Tool metadata for listing
//! - Dispatch of tool calls by public name
//!
//! The registry is filled once, before any transport starts, and is
//! read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::model::Tool;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ToolFailure;
use super::handler::{Arguments, ToolHandler};
use super::sub_server::SubServer;
use crate::core::{Error, Result};

/// Prefix shared by every tool the gateway exposes.
pub const TOOL_PREFIX: &str = "pss_fabric";

/// Public tool name for a sub-server tool.
pub fn prefixed_name(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}_{}", prefix, name),
        _ => name.to_string(),
    }
}

struct RegisteredTool {
    tool: Tool,
    handler: Arc<dyn ToolHandler>,
    server: String,
}

/// Tool registry - maps public tool names to their handlers.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Import every tool of `server`, renamed to `<prefix>_<name>`.
    ///
    /// Either all tools are imported or none: a name collision with an
    /// already registered tool fails the whole import.
    pub fn import_server(&mut self, server: SubServer, prefix: Option<&str>) -> Result<()> {
        let mut staged: Vec<(String, Arc<dyn ToolHandler>)> =
            Vec::with_capacity(server.tools().len());
        for handler in server.tools() {
            let public_name = prefixed_name(prefix, handler.name());
            if self.tools.contains_key(&public_name)
                || staged.iter().any(|(name, _)| name == &public_name)
            {
                warn!(
                    "Tool name collision while importing {}: {}",
                    server.name(),
                    public_name
                );
                return Err(Error::registration(format!(
                    "tool '{}' from '{}' is already registered",
                    public_name,
                    server.name()
                )));
            }
            staged.push((public_name, handler.clone()));
        }

        for (public_name, handler) in staged {
            let mut tool = handler.tool();
            tool.name = public_name.clone().into();
            debug!("Registered tool {} from {}", public_name, server.name());
            self.tools.insert(
                public_name,
                RegisteredTool {
                    tool,
                    handler,
                    server: server.name().to_string(),
                },
            );
        }

        info!(
            "Imported {} with prefix {:?} ({} tool(s))",
            server.name(),
            prefix.unwrap_or_default(),
            server.tools().len()
        );
        Ok(())
    }

    /// Get all public tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.tool.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn call_tool(&self, name: &str, arguments: Arguments) -> std::result::Result<Value, ToolFailure> {
        match self.tools.get(name) {
            Some(registered) => {
                debug!("Dispatching {} to {}", name, registered.server);
                registered.handler.call(arguments).await
            }
            None => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolFailure::not_found(name))
            }
        }
    }
}
