//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures that stop a transport from serving the gateway.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP listener could not bind its address.
    #[error("Cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an I/O failure.
    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),

    /// The MCP session could not be established.
    #[error("MCP session could not start: {0}")]
    Handshake(String),

    /// The MCP session ended abnormally.
    #[error("MCP session aborted: {0}")]
    Session(String),
}

impl TransportError {
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
        }
    }

    pub fn handshake(msg: impl ToString) -> Self {
        Self::Handshake(msg.to_string())
    }

    pub fn session(msg: impl ToString) -> Self {
        Self::Session(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_address() {
        let source = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = TransportError::bind("0.0.0.0:8000", source);
        assert_eq!(err.to_string(), "Cannot listen on 0.0.0.0:8000: address in use");
    }
}
