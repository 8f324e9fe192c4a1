//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (and an optional `.env` file). The configuration is
//! read once at startup and shared read-only, wrapped in an `Arc`, by every
//! client, tool and transport.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Jira REST API connection settings.
    pub jira: JiraConfig,

    /// Xray Cloud API connection settings.
    pub xray: XrayConfig,

    /// Deployment environment (drives error masking).
    pub environment: Environment,

    /// Debug flag (drives the default log level).
    pub debug: bool,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Jira connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Site root, e.g. `https://your-domain.atlassian.net`.
    pub base_url: String,

    /// Account e-mail used as the basic auth user.
    pub email: Option<String>,

    /// API token used as the basic auth password.
    pub api_token: Option<String>,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,
}

/// Xray Cloud connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct XrayConfig {
    /// API root, e.g. `https://xray.cloud.getxray.app`.
    pub base_url: String,

    /// API key client id.
    pub client_id: Option<String>,

    /// API key client secret.
    pub client_secret: Option<String>,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    /// Whether error details must be hidden from callers.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for XrayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrayConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl JiraConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl XrayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: "https://your-domain.atlassian.net".to_string(),
            email: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for XrayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://xray.cloud.getxray.app".to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "Fabric MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            jira: JiraConfig::default(),
            xray: XrayConfig::default(),
            environment: Environment::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from the `.env` file and environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.debug = debug_flag(&lookup);

        if let Some(env) = lookup("ENV") {
            config.environment = env.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to development", e);
                Environment::Development
            });
        }

        config.logging = LoggingConfig::from_lookup(&lookup);

        let timeout_secs = parse_or_default(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);

        let (jira_defaults, xray_defaults) = (JiraConfig::default(), XrayConfig::default());

        config.jira = JiraConfig {
            base_url: lookup("JIRA_BASE_URL").unwrap_or(jira_defaults.base_url),
            email: non_empty(lookup("JIRA_EMAIL")),
            api_token: non_empty(lookup("JIRA_API_TOKEN")),
            timeout_secs,
        };
        if config.jira.email.is_none() || config.jira.api_token.is_none() {
            warn!("JIRA_EMAIL or JIRA_API_TOKEN not set - Jira calls will be rejected");
        }

        config.xray = XrayConfig {
            base_url: lookup("XRAY_BASE_URL").unwrap_or(xray_defaults.base_url),
            client_id: non_empty(lookup("XRAY_CLIENT_ID")),
            client_secret: non_empty(lookup("XRAY_CLIENT_SECRET")),
            timeout_secs,
        };
        if config.xray.client_id.is_none() || config.xray.client_secret.is_none() {
            warn!("XRAY_CLIENT_ID or XRAY_CLIENT_SECRET not set - Xray calls will be rejected");
        }

        config.transport = TransportConfig::from_lookup(&lookup);

        info!(
            "Configuration loaded (environment: {}, debug: {})",
            config.environment, config.debug
        );

        config
    }

    /// Whether the process runs in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

impl LoggingConfig {
    /// Read only the logging settings.
    ///
    /// Used to install the subscriber before the full configuration is
    /// loaded, so warnings raised while loading it are not lost.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_level = if debug_flag(lookup) { "debug" } else { "info" };
        Self {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| default_level.to_string()),
        }
    }
}

fn debug_flag<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false)
}

/// Parse a boolean flag the way `.env` files usually spell them.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a numeric variable, warning and falling back on garbage.
pub(crate) fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using {}", raw, key, default);
            default
        }),
        None => default,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
