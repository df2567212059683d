//! Error types used throughout the integration engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SyncBridge
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncBridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation clashes with the current lifecycle state (already
    /// connected, sync already running, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// No adapter is implemented for the requested external-system type.
    #[error("Unsupported system type: {0}")]
    UnsupportedSystemType(String),

    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("System not connected: {0}")]
    SystemNotConnected(String),

    #[error("Operation timed out after {0}s")]
    SyncTimeout(u64),
}

impl SyncBridgeError {
    /// True for the "unknown id" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::SystemNotFound(_))
    }

    /// True for errors caused by a lifecycle-state clash rather than bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::SystemNotConnected(_))
    }
}

/// Result type alias for SyncBridge operations
pub type Result<T> = std::result::Result<T, SyncBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = SyncBridgeError::SystemNotFound("sys-1".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "SystemNotFound");
        assert_eq!(json["message"], "sys-1");
    }

    #[test]
    fn classifies_not_found_and_conflict() {
        assert!(SyncBridgeError::SystemNotFound("x".into()).is_not_found());
        assert!(SyncBridgeError::NotFound("x".into()).is_not_found());
        assert!(!SyncBridgeError::Config("x".into()).is_not_found());

        assert!(SyncBridgeError::SystemNotConnected("x".into()).is_conflict());
        assert!(SyncBridgeError::Conflict("x".into()).is_conflict());
        assert!(!SyncBridgeError::Network("x".into()).is_conflict());
    }

    #[test]
    fn display_includes_context() {
        let err = SyncBridgeError::UnsupportedSystemType("quickbooks".into());
        assert_eq!(err.to_string(), "Unsupported system type: quickbooks");
        assert_eq!(SyncBridgeError::SyncTimeout(30).to_string(), "Operation timed out after 30s");
    }
}
