//! Xray test case lookup tool.

use std::sync::Arc;

use rmcp::{handler::server::tool::cached_schema_for_type, model::Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domains::clients::{TestCase, XrayClient};
use crate::domains::tools::{Arguments, ToolFailure, ToolHandler, parse_arguments, to_output};

/// Parameters for the Xray test case lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetXrayTestCaseParams {
    #[schemars(description = "Xray test case key (e.g., 'XSP-123')")]
    pub test_case_key: String,
}

/// Xray test case lookup tool implementation.
#[derive(Debug, Clone)]
pub struct GetXrayTestCaseTool {
    client: Arc<XrayClient>,
}

impl GetXrayTestCaseTool {
    /// Tool name as registered in its sub-server.
    pub const NAME: &'static str = "get_xray_test_case";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch an Xray test case by key with all test details. \
         Returns key, summary, status, test type, ordered steps (action, data, expected result) \
         and the raw Jira field map.";

    pub fn new(client: Arc<XrayClient>) -> Self {
        Self { client }
    }

    /// Execute the tool logic.
    pub async fn execute(&self, params: &GetXrayTestCaseParams) -> Result<TestCase, ToolFailure> {
        info!("Xray test case tool called for key: {}", params.test_case_key);

        self.client
            .get_test_case(&params.test_case_key)
            .await
            .map_err(|e| ToolFailure::from_client_error(Self::NAME, e))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetXrayTestCaseParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get Xray test case".into()),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetXrayTestCaseTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn call(&self, arguments: Arguments) -> Result<Value, ToolFailure> {
        let params: GetXrayTestCaseParams = parse_arguments(arguments)?;
        let test_case = self.execute(&params).await?;
        to_output(Self::NAME, &test_case)
    }
}
