//! Domains module containing business logic organized by bounded contexts.
//!
//! - **clients**: REST clients for the external systems (Jira, Xray)
//! - **tools**: MCP tools built on those clients, grouped into sub-servers

pub mod clients;
pub mod tools;
