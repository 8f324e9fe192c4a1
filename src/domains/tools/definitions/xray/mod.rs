//! Xray sub-server.

pub mod get_test_case;

use std::sync::Arc;

pub use get_test_case::{GetXrayTestCaseParams, GetXrayTestCaseTool};

use crate::core::{Config, Result};
use crate::domains::clients::XrayClient;
use crate::domains::tools::SubServer;

/// Display name of the Xray sub-server.
pub const XRAY_SERVER_NAME: &str = "Fabric Xray MCP Server";

/// Build the Xray sub-server with its client wired from configuration.
pub fn xray_server(config: &Config) -> Result<SubServer> {
    let client = Arc::new(XrayClient::new(&config.xray)?);
    Ok(SubServer::new(XRAY_SERVER_NAME).with_tool(GetXrayTestCaseTool::new(client)))
}
