//! Tool handler trait.
//!
//! Every tool owned by a sub-server implements [`ToolHandler`]. The registry
//! only ever talks to tools through this trait.

use rmcp::model::Tool;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::error;

use super::error::ToolFailure;

/// Raw tool arguments as received from the client.
pub type Arguments = Map<String, Value>;

/// Trait for implementing tool handlers.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name of the tool inside its own sub-server (unprefixed).
    fn name(&self) -> &'static str;

    /// Tool metadata: description and input schema.
    fn tool(&self) -> Tool;

    /// Execute the tool with the given arguments.
    async fn call(&self, arguments: Arguments) -> Result<Value, ToolFailure>;
}

/// Deserialize tool arguments into the tool's parameter struct.
pub fn parse_arguments<T: DeserializeOwned>(arguments: Arguments) -> Result<T, ToolFailure> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ToolFailure::invalid_arguments(e.to_string()))
}

/// Serialize a tool's result for the invocation layer.
pub fn to_output<T: Serialize>(tool: &str, output: &T) -> Result<Value, ToolFailure> {
    serde_json::to_value(output).map_err(|e| {
        error!(tool = %tool, severity = "critical", "Failed to serialize output: {}", e);
        ToolFailure::Unexpected(e.into())
    })
}
