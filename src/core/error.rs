//! Error types and handling for the MCP server.
//!
//! This module defines the error type for server construction and startup:
//! building clients, registering tools and running transports. Per-call
//! failures never surface here; they are handled at the tool boundary.

use thiserror::Error;

use super::transport::TransportError;
use crate::domains::clients::ClientError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// An external client could not be constructed.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Two tools ended up with the same public name.
    #[error("Tool registration error: {0}")]
    Registration(String),

    /// Transport failures (bind, serve, stdio session).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    /// Create a new registration error.
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }
}
