//! Tool-specific error types.

use thiserror::Error;
use tracing::error;

use crate::domains::clients::ClientError;

/// The single error value callers ever see from a tool.
///
/// Invalid input, authorization and infrastructure faults all collapse into
/// this type; which one it was is only recorded in the server logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while dispatching or executing a tool.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// A classified fault, already logged and safe to show.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The arguments did not match the tool's input schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Anything unforeseen. Passed through untouched; the invocation layer
    /// decides how much of it the caller gets to see.
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl ToolFailure {
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Map a client failure onto the tool boundary, logging it on the way.
    pub fn from_client_error(tool: &str, err: ClientError) -> Self {
        match err {
            ClientError::Unclassified(source) => {
                error!(
                    tool = %tool,
                    severity = "critical",
                    "Unexpected error in {} tool: {:?}",
                    tool,
                    source
                );
                Self::Unexpected(source)
            }
            classified => {
                error!(
                    tool = %tool,
                    fault = classified.kind(),
                    status = classified.status().map(|s| s.as_u16()),
                    "Error in {} tool: {}",
                    tool,
                    classified.detail()
                );
                Self::Tool(ToolError::new(classified.to_string()))
            }
        }
    }
}
