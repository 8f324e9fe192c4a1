//! Fabric MCP Server Library
//!
//! An MCP gateway that exposes Jira issues and Xray test cases as tools.
//! Each external system contributes a sub-server; both are merged under the
//! `pss_fabric` prefix and served over HTTP at `/fabric/mcp` (or over STDIO).
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling and masking, the merged server and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **clients**: REST clients for Jira and Xray Cloud
//!   - **tools**: MCP tools built on those clients, grouped into sub-servers
//!
//! # Example
//!
//! ```rust,no_run
//! use fabric_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = TransportService::new(config.transport.clone());
//!     let server = McpServer::build(config)?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
