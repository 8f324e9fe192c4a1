//! Jira sub-server.

pub mod get_issue;

use std::sync::Arc;

pub use get_issue::{GetJiraIssueParams, GetJiraIssueTool};

use crate::core::{Config, Result};
use crate::domains::clients::JiraClient;
use crate::domains::tools::SubServer;

/// Display name of the Jira sub-server.
pub const JIRA_SERVER_NAME: &str = "Fabric JIRA MCP Server";

/// Build the Jira sub-server with its client wired from configuration.
pub fn jira_server(config: &Config) -> Result<SubServer> {
    let client = Arc::new(JiraClient::new(&config.jira)?);
    Ok(SubServer::new(JIRA_SERVER_NAME).with_tool(GetJiraIssueTool::new(client)))
}
