//! Error types for the Livedeck dashboard core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Livedeck workspace.
///
/// Each variant maps to one failure class of the stream pipeline, so callers can
/// decide whether a failure is per-event (drop and continue), per-connection
/// (transition the supervisor) or per-action (report to whoever asked).
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LivedeckError {
    /// A single event payload could not be decoded or classified
    #[error("Payload error: {message}")]
    Payload { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// The push-stream transport failed or closed
    #[error("Transport error: {0}")]
    Transport(String),

    /// A side-channel control call failed
    #[error("Control call '{action}' failed: {message}")]
    Control { action: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LivedeckError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Payload error
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Control error for the named action
    pub fn control(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Control {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a payload error
    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload { .. } | Self::Serialization { .. })
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a control-call error
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LivedeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LivedeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LivedeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for LivedeckError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, LivedeckError>`.
pub type Result<T> = std::result::Result<T, LivedeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_are_payload_class() {
        let err: LivedeckError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_payload());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn control_error_names_action() {
        let err = LivedeckError::control("batch_control", "connection refused");
        assert!(err.is_control());
        assert_eq!(
            err.to_string(),
            "Control call 'batch_control' failed: connection refused"
        );
    }
}
