//! Tracing setup and command logging

use std::time::Duration;

use anyhow::anyhow;
use syncbridge_domain::{LoggingConfig, SyncBridgeError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a subscriber
/// is already installed or the level directive is malformed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|err| anyhow!("invalid log level '{}': {err}", config.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json { builder.json().try_init() } else { builder.try_init() };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a stable identifier such as `"sync::start_sync"`; callers
/// must not forward configuration values or credentials through it.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error_type: Option<&str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => warn!(command, duration_ms, error_type, "command_execution_failure"),
    }
}

/// Convert a `SyncBridgeError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &SyncBridgeError) -> &'static str {
    match error {
        SyncBridgeError::Config(_) => "config",
        SyncBridgeError::Network(_) => "network",
        SyncBridgeError::Auth(_) => "auth",
        SyncBridgeError::NotFound(_) => "not_found",
        SyncBridgeError::InvalidInput(_) => "invalid_input",
        SyncBridgeError::Conflict(_) => "conflict",
        SyncBridgeError::Internal(_) => "internal",
        SyncBridgeError::UnsupportedSystemType(_) => "unsupported_system_type",
        SyncBridgeError::SystemNotFound(_) => "system_not_found",
        SyncBridgeError::SystemNotConnected(_) => "system_not_connected",
        SyncBridgeError::SyncTimeout(_) => "timeout",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable_snake_case() {
        let cases = [
            (SyncBridgeError::SystemNotFound("x".into()), "system_not_found"),
            (SyncBridgeError::SystemNotConnected("x".into()), "system_not_connected"),
            (SyncBridgeError::UnsupportedSystemType("x".into()), "unsupported_system_type"),
            (SyncBridgeError::SyncTimeout(3), "timeout"),
            (SyncBridgeError::Conflict("x".into()), "conflict"),
        ];

        for (error, label) in cases {
            assert_eq!(error_label(&error), label);
        }
    }
}
