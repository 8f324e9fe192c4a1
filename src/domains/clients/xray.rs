//! Xray Cloud client.
//!
//! Xray Cloud exchanges an API key pair for a short-lived bearer token
//! (`POST /api/v2/authenticate`) and serves test data through GraphQL
//! (`POST /api/v2/graphql`). The token is requested on every call; nothing
//! is cached between calls.

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::common::{
    build_http_client, endpoint, nested_string, normalize_key, string_field, string_list,
};
use super::error::{ClientError, ClientResult};
use crate::core::config::XrayConfig;

const SYSTEM: &str = "Xray";

const GET_TEST_QUERY: &str = r#"query GetTestCase($jql: String!) {
  getTests(jql: $jql, limit: 1) {
    total
    results {
      issueId
      testType { name kind }
      steps { id action data result }
      jira(fields: ["key", "summary", "status", "priority", "labels", "assignee", "description"])
    }
  }
}"#;

/// An Xray test case as returned to tool callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub key: String,
    pub issue_id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub test_type: Option<String>,
    pub test_kind: Option<String>,
    pub steps: Vec<TestStep>,
    /// Raw Jira fields attached to the test.
    pub all_fields: Map<String, Value>,
}

/// One manual step of a test, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    pub id: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTestsData {
    get_tests: Option<TestResults>,
}

#[derive(Debug, Deserialize)]
struct TestResults {
    #[serde(default)]
    results: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTest {
    issue_id: String,
    test_type: Option<RawTestType>,
    #[serde(default)]
    steps: Vec<TestStep>,
    #[serde(default)]
    jira: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawTestType {
    name: Option<String>,
    kind: Option<String>,
}

impl TestCase {
    fn from_raw(raw: RawTest, requested_key: &str) -> Self {
        let fields = &raw.jira;
        let (test_type, test_kind) = raw
            .test_type
            .map(|t| (t.name, t.kind))
            .unwrap_or_default();
        Self {
            key: string_field(fields, "key").unwrap_or_else(|| requested_key.to_string()),
            summary: string_field(fields, "summary"),
            status: nested_string(fields, "status", "name"),
            priority: nested_string(fields, "priority", "name"),
            assignee: nested_string(fields, "assignee", "displayName"),
            labels: string_list(fields, "labels"),
            issue_id: raw.issue_id,
            test_type,
            test_kind,
            steps: raw.steps,
            all_fields: raw.jira,
        }
    }
}

/// Client for the Xray Cloud API.
#[derive(Debug, Clone)]
pub struct XrayClient {
    http: reqwest::Client,
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl XrayClient {
    /// Create a client from the Xray section of the configuration.
    pub fn new(config: &XrayConfig) -> ClientResult<Self> {
        Ok(Self {
            http: build_http_client(config.timeout())?,
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Exchange the API key pair for a bearer token.
    async fn authenticate(&self) -> ClientResult<String> {
        let (Some(client_id), Some(client_secret)) =
            (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            return Err(ClientError::unauthorized(
                "Xray credentials are not configured (XRAY_CLIENT_ID / XRAY_CLIENT_SECRET)",
            ));
        };

        let url = endpoint(&self.base_url, "api/v2/authenticate")?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "client_id": client_id, "client_secret": client_secret }))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, SYSTEM))?;

        let status = response.status();
        if !status.is_success() {
            // Any rejection of the key pair itself is an authorization fault.
            if status.is_client_error() {
                return Err(ClientError::unauthorized(format!(
                    "Xray authentication failed with status {}",
                    status
                ))
                .with_status(status));
            }
            return Err(ClientError::from_status(status, "Xray token", SYSTEM));
        }

        let token: String = response
            .json()
            .await
            .map_err(|e| ClientError::from_transport(e, SYSTEM))?;
        if token.trim().is_empty() {
            return Err(ClientError::infrastructure("Xray returned an empty token"));
        }
        Ok(token)
    }

    /// Fetch a test case by key, including type and ordered steps.
    pub async fn get_test_case(&self, test_case_key: &str) -> ClientResult<TestCase> {
        let key = normalize_key(test_case_key, "test case key")?;
        let token = self.authenticate().await?;
        let url = endpoint(&self.base_url, "api/v2/graphql")?;

        debug!(%url, "Fetching Xray test case {}", key);

        let body = json!({
            "query": GET_TEST_QUERY,
            "variables": { "jql": format!("key = \"{}\"", key) },
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, SYSTEM))?;

        let what = format!("Xray test case {}", key);
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::from_status(status, &what, SYSTEM));
        }

        let payload: GraphQlResponse<GetTestsData> = response
            .json()
            .await
            .map_err(|e| ClientError::from_transport(e, SYSTEM))?;

        if !payload.errors.is_empty() {
            let messages: Vec<_> = payload.errors.iter().map(|e| e.message.as_str()).collect();
            warn!("Xray GraphQL errors for {}: {:?}", key, messages);
            return Err(ClientError::infrastructure(format!(
                "Xray query failed: {}",
                messages.join("; ")
            )));
        }

        let raw = payload
            .data
            .and_then(|data| data.get_tests)
            .and_then(|tests| tests.results.into_iter().next())
            .ok_or_else(|| ClientError::invalid_input(format!("{} not found", what)))?;

        let test_case = TestCase::from_raw(raw, &key);
        info!(
            "Fetched Xray test case {} ({} step(s))",
            test_case.key,
            test_case.steps.len()
        );
        Ok(test_case)
    }
}
