//! External REST clients.
//!
//! Thin async wrappers around the Jira and Xray Cloud APIs. Each client
//! exposes one fetch-by-key operation and reports failures as one of the
//! semantic [`ClientError`] kinds.

pub mod common;
mod error;
pub mod jira;
pub mod xray;

pub use error::{ClientError, ClientResult};
pub use jira::{Issue, JiraClient};
pub use xray::{TestCase, TestStep, XrayClient};
