//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, error masking, the merged server and its
//! lifecycle, and the transport layer.

pub mod config;
pub mod error;
pub mod masking;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use masking::ErrorMasking;
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
