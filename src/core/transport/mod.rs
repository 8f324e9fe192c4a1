//! Transport layer for the MCP server.
//!
//! This module provides two transport implementations:
//! - **HTTP**: JSON-RPC over POST under `/fabric`, health endpoints under
//!   `/api`, CORS and a catch-all error handler
//! - **STDIO**: Standard input/output - feature: `stdio`
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the MCP server handler.

mod config;
mod error;
mod service;

pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::{HttpConfig, TransportConfig, parse_origins};
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
