//! Tools domain module.
//!
//! Tools are the externally callable operations of the gateway. Each
//! external system contributes one sub-server; the sub-servers are merged
//! into a single registry under a shared prefix before any transport starts.
//!
//! ## Architecture
//!
//! - `definitions/` - Sub-servers and their tools (one file per tool)
//! - `handler.rs` - The `ToolHandler` trait every tool implements
//! - `sub_server.rs` - Named groups of tools
//! - `registry.rs` - Prefixed import and dispatch
//! - `error.rs` - `ToolError` (what callers see) and `ToolFailure`

pub mod definitions;
mod error;
mod handler;
mod registry;
mod sub_server;

pub use error::{ToolError, ToolFailure};
pub use handler::{Arguments, ToolHandler, parse_arguments, to_output};
pub use registry::{TOOL_PREFIX, ToolRegistry, prefixed_name};
pub use sub_server::SubServer;
