//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use syncbridge_domain::SyncBridgeError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub SyncBridgeError);

impl From<InfraError> for SyncBridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyncBridgeError> for InfraError {
    fn from(value: SyncBridgeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSyncBridgeError {
    fn into_syncbridge(self) -> SyncBridgeError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SyncBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoSyncBridgeError for HttpError {
    fn into_syncbridge(self) -> SyncBridgeError {
        if self.is_timeout() {
            return SyncBridgeError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SyncBridgeError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return SyncBridgeError::Network(format!("malformed response body: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status.as_u16(), status.canonical_reason());
        }

        SyncBridgeError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_syncbridge())
    }
}

/// Map an HTTP status onto the domain taxonomy.
pub(crate) fn status_error(code: u16, reason: Option<&str>) -> SyncBridgeError {
    let message = format!("HTTP {} {}", code, reason.unwrap_or("unknown status"));

    match code {
        401 | 403 => SyncBridgeError::Auth(message),
        404 => SyncBridgeError::NotFound(message),
        429 => SyncBridgeError::Network(message),
        400..=499 => SyncBridgeError::InvalidInput(message),
        _ => SyncBridgeError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SyncBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoSyncBridgeError for JsonError {
    fn into_syncbridge(self) -> SyncBridgeError {
        use serde_json::error::Category;

        match self.classify() {
            Category::Io => SyncBridgeError::Network(format!("I/O error reading JSON: {self}")),
            Category::Eof => SyncBridgeError::Network(format!("truncated JSON payload: {self}")),
            Category::Syntax | Category::Data => {
                SyncBridgeError::InvalidInput(format!("unexpected JSON payload: {self}"))
            }
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_syncbridge())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
