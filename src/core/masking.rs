//! Error detail masking.
//!
//! One policy for everything that reaches a caller: classified tool faults
//! always keep their message, while unclassified faults and HTTP-level
//! crashes only expose their text outside production.

use std::fmt::Display;

use serde_json::{Value, json};

use super::config::Config;

/// Generic body detail for unhandled HTTP errors.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Decides how much of an unexpected failure a caller gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMasking {
    mask_details: bool,
}

impl ErrorMasking {
    pub fn new(mask_details: bool) -> Self {
        Self { mask_details }
    }

    /// Masking is on exactly in production mode.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.is_production())
    }

    pub fn masks_details(&self) -> bool {
        self.mask_details
    }

    /// Message returned for an unclassified fault raised inside a tool.
    pub fn tool_error_message(&self, tool: &str, error: &dyn Display) -> String {
        if self.mask_details {
            format!("Error calling tool '{}'", tool)
        } else {
            format!("Error calling tool '{}': {}", tool, error)
        }
    }

    /// JSON body for the HTTP catch-all 500 response.
    pub fn internal_error_body(&self, error: &dyn Display) -> Value {
        if self.mask_details {
            json!({ "detail": INTERNAL_SERVER_ERROR })
        } else {
            json!({ "detail": INTERNAL_SERVER_ERROR, "error": error.to_string() })
        }
    }
}
