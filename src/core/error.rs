//! Error types and handling for the tools server.
//!
//! This module defines a unified error type that can represent errors from
//! the tools domain, the HTTP transport and configuration.

use thiserror::Error;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the tools server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Error originating from the HTTP transport.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;
    use crate::domains::tools::ToolError;

    #[test]
    fn test_tool_errors_convert() {
        let err: Error = ToolError::not_found("calculator").into();
        assert_eq!(err.to_string(), "Tool error: Tool not found: calculator");
    }

    #[test]
    fn test_transport_errors_convert() {
        let err: Error = TransportError::http("connection reset").into();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(
            err.to_string(),
            "Transport error: HTTP error: connection reset"
        );
    }

    #[test]
    fn test_config_error_message() {
        assert_eq!(
            Error::config("bad prefix").to_string(),
            "Configuration error: bad prefix"
        );
    }
}
