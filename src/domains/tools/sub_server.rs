//! Independently constructed groups of tools.
//!
//! A [`SubServer`] owns its tools under their plain names. It is consumed
//! by [`ToolRegistry::import_server`](super::ToolRegistry::import_server),
//! which re-registers every tool under a shared prefix.

use std::fmt;
use std::sync::Arc;

use super::handler::ToolHandler;

/// A named set of tools merged into the parent server at startup.
#[derive(Clone)]
pub struct SubServer {
    name: String,
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl SubServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    /// Add a tool to this sub-server.
    pub fn with_tool<T: ToolHandler + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &[Arc<dyn ToolHandler>] {
        &self.tools
    }

    /// Unprefixed tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for SubServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubServer")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish()
    }
}
