//! Command error surface

use serde::Serialize;
use syncbridge_domain::SyncBridgeError;
use thiserror::Error;

use crate::utils::logging::error_label;

/// Error returned to command callers, ready to forward over any transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct CommandError {
    /// HTTP-equivalent status code.
    pub status: u16,
    /// Stable machine-readable label.
    pub kind: &'static str,
    pub message: String,
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;

impl CommandError {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl From<SyncBridgeError> for CommandError {
    fn from(error: SyncBridgeError) -> Self {
        let status = match &error {
            SyncBridgeError::NotFound(_) | SyncBridgeError::SystemNotFound(_) => 404,
            SyncBridgeError::Conflict(_) | SyncBridgeError::SystemNotConnected(_) => 409,
            SyncBridgeError::InvalidInput(_)
            | SyncBridgeError::Config(_)
            | SyncBridgeError::UnsupportedSystemType(_) => 400,
            SyncBridgeError::Auth(_)
            | SyncBridgeError::Network(_)
            | SyncBridgeError::SyncTimeout(_)
            | SyncBridgeError::Internal(_) => 500,
        };

        Self { status, kind: error_label(&error), message: error.to_string() }
    }
}
