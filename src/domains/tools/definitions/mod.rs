//! Tool definitions module.
//!
//! One sub-server per external system, one file per tool.

pub mod jira;
pub mod xray;

pub use jira::{GetJiraIssueParams, GetJiraIssueTool, jira_server};
pub use xray::{GetXrayTestCaseParams, GetXrayTestCaseTool, xray_server};
