//! Error types and result aliases for the toolchat library.
//!
//! This module defines the core error type [`ToolchatError`] and the [`Result`] type alias
//! used throughout the library. Errors returned from a model call or from startup are
//! fatal to the session; tool errors are turned into tool-result text by the registry
//! and never cross the conversation loop boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolchatError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("History error: {0}")]
    HistoryError(String),

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, ToolchatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = ToolchatError::GatewayError("connection failed".to_string());
        assert_eq!(err.to_string(), "LLM gateway error: connection failed");
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolchatError::ToolError("invalid parameters".to_string());
        assert_eq!(err.to_string(), "Tool error: invalid parameters");
    }

    #[test]
    fn test_config_error_display() {
        let err = ToolchatError::ConfigError("missing API key".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: missing API key");
    }

    #[test]
    fn test_step_limit_display() {
        let err = ToolchatError::StepLimitExceeded(25);
        assert_eq!(err.to_string(), "Step limit of 25 exceeded");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ToolchatError = json_err.into();

        match err {
            ToolchatError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ToolchatError = io_err.into();

        match err {
            ToolchatError::IoError(_) => {}
            _ => panic!("Expected IoError"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = ToolchatError::HistoryError("orphan".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("HistoryError"));
    }
}
