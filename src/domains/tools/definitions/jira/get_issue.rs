//! Jira issue lookup tool.
//!
//! Fetches a single Jira issue by key with all of its fields, custom fields
//! included.

use std::sync::Arc;

use rmcp::{handler::server::tool::cached_schema_for_type, model::Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domains::clients::{Issue, JiraClient};
use crate::domains::tools::{Arguments, ToolFailure, ToolHandler, parse_arguments, to_output};

/// Parameters for the Jira issue lookup.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetJiraIssueParams {
    /// Jira issue key.
    #[schemars(description = "Jira issue key (e.g., 'PROJ-123')")]
    pub issue_key: String,
}

/// Jira issue lookup tool implementation.
#[derive(Debug, Clone)]
pub struct GetJiraIssueTool {
    client: Arc<JiraClient>,
}

impl GetJiraIssueTool {
    /// Tool name as registered in its sub-server.
    pub const NAME: &'static str = "get_jira_issue";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch a Jira issue by key with all fields including custom fields. \
         Returns key, summary, status, priority, assignee, issue type, labels and the raw field map.";

    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }

    /// Execute the tool logic.
    pub async fn execute(&self, params: &GetJiraIssueParams) -> Result<Issue, ToolFailure> {
        info!("Jira issue tool called for key: {}", params.issue_key);

        self.client
            .get_issue(&params.issue_key)
            .await
            .map_err(|e| ToolFailure::from_client_error(Self::NAME, e))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetJiraIssueParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get Jira issue".into()),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetJiraIssueTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn call(&self, arguments: Arguments) -> Result<Value, ToolFailure> {
        let params: GetJiraIssueParams = parse_arguments(arguments)?;
        let issue = self.execute(&params).await?;
        to_output(Self::NAME, &issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::JiraConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(server: &MockServer) -> GetJiraIssueTool {
        let config = JiraConfig {
            base_url: server.uri(),
            email: Some("bot@acme.io".to_string()),
            api_token: Some("token".to_string()),
            timeout_secs: 1,
        };
        GetJiraIssueTool::new(Arc::new(JiraClient::new(&config).unwrap()))
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_schema_requires_issue_key() {
        let tool = GetJiraIssueTool::to_tool();
        assert_eq!(tool.name, "get_jira_issue");
        let required = tool.input_schema.get("required").cloned().unwrap_or_default();
        assert_eq!(required, json!(["issue_key"]));
    }

    #[tokio::test]
    async fn test_call_returns_requested_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1",
                "key": "PROJ-123",
                "fields": { "summary": "Broken build" }
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server);
        let value = tool.call(args(json!({ "issue_key": "PROJ-123" }))).await.unwrap();
        assert_eq!(value["key"], "PROJ-123");
        assert_eq!(value["summary"], "Broken build");
        assert_eq!(value["all_fields"]["summary"], "Broken build");
    }

    #[tokio::test]
    async fn test_missing_issue_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tool = tool_for(&server);
        let err = tool
            .call(args(json!({ "issue_key": "PROJ-999999" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolFailure::Tool(e) if e.message().contains("PROJ-999999")));
    }

    #[tokio::test]
    async fn test_forbidden_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let tool = tool_for(&server);
        let err = tool.call(args(json!({ "issue_key": "PROJ-1" }))).await.unwrap_err();
        assert!(matches!(err, ToolFailure::Tool(_)));
    }

    #[tokio::test]
    async fn test_wrong_argument_name() {
        let server = MockServer::start().await;
        let tool = tool_for(&server);
        let err = tool.call(args(json!({ "key": "PROJ-1" }))).await.unwrap_err();
        assert!(matches!(err, ToolFailure::InvalidArguments(_)));
    }
}
