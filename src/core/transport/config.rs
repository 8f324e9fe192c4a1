//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::config::parse_or_default;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// HTTP transport: JSON-RPC over POST plus health endpoints.
    Http(HttpConfig),

    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path segment the MCP server is mounted under.
    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    /// JSON-RPC endpoint path inside the mount.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Path segment hosting the health endpoints.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Origins allowed by the CORS policy. `*` mirrors any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_mount_path() -> String {
    "/fabric".to_string()
}

fn default_rpc_path() -> String {
    "/mcp".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Http(HttpConfig::default())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: default_host(),
            mount_path: default_mount_path(),
            rpc_path: default_rpc_path(),
            api_prefix: default_api_prefix(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl HttpConfig {
    /// Full path of the JSON-RPC endpoint, e.g. `/fabric/mcp`.
    pub fn rpc_endpoint(&self) -> String {
        format!("{}{}", self.mount_path, self.rpc_path)
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl TransportConfig {
    /// Load transport config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = lookup("MCP_TRANSPORT").unwrap_or_default().to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            _ => {
                let defaults = HttpConfig::default();
                let port = parse_or_default(lookup, "PORT", defaults.port);
                let host = lookup("HOST").unwrap_or(defaults.host);
                let cors_origins = lookup("CORS_ORIGINS")
                    .map(|raw| parse_origins(&raw))
                    .unwrap_or(defaults.cors_origins);
                Self::Http(HttpConfig {
                    port,
                    host,
                    cors_origins,
                    ..HttpConfig::default()
                })
            }
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_endpoint()),
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, https://b.test ,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_http_from_lookup() {
        let lookup = |key: &str| match key {
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some("9100".to_string()),
            "CORS_ORIGINS" => Some("https://app.test,https://admin.test".to_string()),
            _ => None,
        };
        let TransportConfig::Http(cfg) = TransportConfig::from_lookup(&lookup) else {
            panic!("expected HTTP transport");
        };
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.cors_origins.len(), 2);
        assert_eq!(cfg.rpc_endpoint(), "/fabric/mcp");
    }

    #[test]
    fn test_invalid_port_uses_default() {
        let lookup = |key: &str| (key == "PORT").then(|| "eighty".to_string());
        let TransportConfig::Http(cfg) = TransportConfig::from_lookup(&lookup) else {
            panic!("expected HTTP transport");
        };
        assert_eq!(cfg.port, 8000);
    }

    #[cfg(feature = "stdio")]
    #[test]
    fn test_stdio_from_lookup() {
        let lookup = |key: &str| (key == "MCP_TRANSPORT").then(|| "STDIO".to_string());
        assert!(TransportConfig::from_lookup(&lookup).is_stdio());
    }
}
