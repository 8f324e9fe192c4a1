//! Semantic error kinds raised by the external REST clients.

use std::error::Error as StdError;

use http::StatusCode;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a single fetch against Jira or Xray.
///
/// The first three variants are classified faults; the tool layer turns them
/// into a `ToolError`. `Unclassified` is everything nobody planned for and is
/// propagated as-is.
///
/// `Display` is the caller-facing message only. The remote status and the
/// underlying transport error are kept for the server logs.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed key or missing entity.
    #[error("{message}")]
    InvalidInput {
        message: String,
        status: Option<StatusCode>,
    },

    /// Missing, expired or insufficient credentials.
    #[error("{message}")]
    Unauthorized {
        message: String,
        status: Option<StatusCode>,
    },

    /// Network failure, timeout, unexpected status or malformed body.
    #[error("{message}")]
    Infrastructure {
        message: String,
        status: Option<StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl ClientError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
            status: None,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: msg.into(),
            status: None,
        }
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: msg.into(),
            status: None,
            source: None,
        }
    }

    /// Attach the HTTP status the remote system answered with.
    pub fn with_status(mut self, code: StatusCode) -> Self {
        match &mut self {
            Self::InvalidInput { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Infrastructure { status, .. } => *status = Some(code),
            Self::Unclassified(_) => {}
        }
        self
    }

    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::Unauthorized { .. } => "permission",
            Self::Infrastructure { .. } => "runtime",
            Self::Unclassified(_) => "unclassified",
        }
    }

    /// Whether this is one of the three known fault categories.
    pub fn is_classified(&self) -> bool {
        !matches!(self, Self::Unclassified(_))
    }

    /// Remote HTTP status, when the fault came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidInput { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Infrastructure { status, .. } => *status,
            Self::Unclassified(_) => None,
        }
    }

    /// The message followed by every underlying cause, for the logs.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            detail.push_str(": ");
            detail.push_str(&err.to_string());
            cause = err.source();
        }
        detail
    }

    /// Classify a non-success HTTP status from a remote system.
    ///
    /// `what` names the entity being fetched, e.g. `Jira issue PROJ-1`.
    pub fn from_status(status: StatusCode, what: &str, system: &str) -> Self {
        let err = match status {
            StatusCode::BAD_REQUEST => Self::invalid_input(format!("Invalid request for {}", what)),
            StatusCode::NOT_FOUND => Self::invalid_input(format!("{} not found", what)),
            StatusCode::UNAUTHORIZED => {
                Self::unauthorized(format!("{} authentication failed: check credentials", system))
            }
            StatusCode::FORBIDDEN => {
                Self::unauthorized(format!("{} denied access to {}", system, what))
            }
            other => Self::infrastructure(format!(
                "{} returned unexpected status {} for {}",
                system, other, what
            )),
        };
        err.with_status(status)
    }

    /// Classify a transport-level reqwest failure, keeping it as the source.
    pub fn from_transport(err: reqwest::Error, system: &str) -> Self {
        let message = if err.is_timeout() {
            format!("{} request timed out", system)
        } else if err.is_connect() {
            format!("Could not connect to {}", system)
        } else if err.is_decode() {
            format!("{} returned a malformed response", system)
        } else {
            format!("{} request failed", system)
        };
        Self::Infrastructure {
            message,
            status: err.status(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let what = "Jira issue PROJ-1";
        assert_eq!(ClientError::from_status(StatusCode::NOT_FOUND, what, "Jira").kind(), "invalid_input");
        assert_eq!(ClientError::from_status(StatusCode::BAD_REQUEST, what, "Jira").kind(), "invalid_input");
        assert_eq!(ClientError::from_status(StatusCode::UNAUTHORIZED, what, "Jira").kind(), "permission");
        assert_eq!(ClientError::from_status(StatusCode::FORBIDDEN, what, "Jira").kind(), "permission");
        assert_eq!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, what, "Jira").kind(),
            "runtime"
        );
        assert_eq!(
            ClientError::from_status(StatusCode::TOO_MANY_REQUESTS, what, "Jira").kind(),
            "runtime"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "Jira issue PROJ-999999", "Jira");
        assert_eq!(err.to_string(), "Jira issue PROJ-999999 not found");
    }

    #[test]
    fn test_unclassified_is_transparent() {
        let err = ClientError::from(anyhow::anyhow!("relative URL without a base"));
        assert!(!err.is_classified());
        assert_eq!(err.to_string(), "relative URL without a base");
    }

    #[test]
    fn test_status_is_kept_out_of_message() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, "Jira issue PROJ-1", "Jira");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!err.to_string().contains("401"));
        assert_eq!(err.detail(), err.to_string());
    }

    #[test]
    fn test_detail_follows_source_chain() {
        let err = ClientError::from(
            anyhow::anyhow!("connection reset").context("invalid base URL 'x'"),
        );
        assert_eq!(err.to_string(), "invalid base URL 'x'");
        assert_eq!(err.detail(), "invalid base URL 'x': connection reset");
    }
}
