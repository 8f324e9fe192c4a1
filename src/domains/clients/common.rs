//! Helpers shared by the Jira and Xray clients.

use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use serde_json::{Map, Value};

use super::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("fabric-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Check if a string looks like an issue key such as `PROJ-123`.
///
/// Project part: an uppercase letter followed by uppercase letters, digits
/// or underscores. Number part: one or more digits.
pub fn is_issue_key(key: &str) -> bool {
    let Some((project, number)) = key.split_once('-') else {
        return false;
    };
    let mut project_chars = project.chars();
    let starts_with_letter = project_chars
        .next()
        .is_some_and(|c| c.is_ascii_uppercase());

    starts_with_letter
        && project_chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Trim and upper-case a key, then reject anything that is not a valid key.
pub fn normalize_key(key: &str, label: &str) -> ClientResult<String> {
    let normalized = key.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(ClientError::invalid_input(format!("{} must not be empty", label)));
    }
    if !is_issue_key(&normalized) {
        return Err(ClientError::invalid_input(format!(
            "Invalid {} '{}' (expected format PROJECT-123)",
            label,
            key.trim()
        )));
    }
    Ok(normalized)
}

/// Build the async HTTP client used for one external system.
pub fn build_http_client(timeout: Duration) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
        .map_err(ClientError::Unclassified)
}

/// Join a path onto a configured base URL.
///
/// A base URL that does not parse is a deployment bug, not a caller
/// mistake, so it is reported as unclassified.
pub fn endpoint(base_url: &str, path: &str) -> ClientResult<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(path.trim_start_matches('/')))
        .with_context(|| format!("invalid base URL '{}'", base_url))
        .map_err(ClientError::Unclassified)
}

/// Plain string field of a Jira field map.
pub(crate) fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

/// `fields[name][inner]` as a string, e.g. `status.name`.
pub(crate) fn nested_string(fields: &Map<String, Value>, name: &str, inner: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(|value| value.get(inner))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// String entries of an array field; anything else is skipped.
pub(crate) fn string_list(fields: &Map<String, Value>, name: &str) -> Vec<String> {
    fields
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_issue_key_valid() {
        assert!(is_issue_key("PROJ-123"));
        assert!(is_issue_key("XSP-1"));
        assert!(is_issue_key("AB_2-99"));
    }

    #[test]
    fn test_is_issue_key_invalid() {
        assert!(!is_issue_key("PROJ"));
        assert!(!is_issue_key("PROJ-"));
        assert!(!is_issue_key("-123"));
        assert!(!is_issue_key("1PROJ-123"));
        assert!(!is_issue_key("PROJ-12a"));
        assert!(!is_issue_key("PROJ-1-2"));
        assert!(!is_issue_key("proj-123"));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" proj-123 ", "issue key").unwrap(), "PROJ-123");

        let err = normalize_key("", "issue key").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");

        let err = normalize_key("not a key", "issue key").unwrap_err();
        assert!(err.to_string().contains("not a key"));
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let url = endpoint("https://acme.test/jira", "/rest/api/3/issue/PROJ-1").unwrap();
        assert_eq!(url.as_str(), "https://acme.test/jira/rest/api/3/issue/PROJ-1");
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        let err = endpoint("not a url", "rest").unwrap_err();
        assert!(!err.is_classified());
    }

    #[test]
    fn test_field_helpers() {
        let fields = serde_json::json!({
            "summary": "Broken build",
            "status": { "name": "Open" },
            "assignee": null,
            "labels": ["ci", 7, "infra"]
        });
        let fields = fields.as_object().unwrap();
        assert_eq!(string_field(fields, "summary").as_deref(), Some("Broken build"));
        assert_eq!(nested_string(fields, "status", "name").as_deref(), Some("Open"));
        assert_eq!(nested_string(fields, "assignee", "displayName"), None);
        assert_eq!(string_list(fields, "labels"), vec!["ci", "infra"]);
        assert!(string_list(fields, "components").is_empty());
    }
}
