//! Connection manager - drives systems through their lifecycle states
//!
//! ```text
//! inactive/error ──connect──▶ connecting ──adapter ok──▶ active
//!                                  └──false/err/timeout──▶ error
//! any ──disconnect──▶ inactive   (error if the adapter disconnect fails)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use syncbridge_domain::{
    ConnectionConfig, ConnectionTestReport, EngineConfig, Result, SyncBridgeError, SystemStatus,
};
use tracing::{error, info, instrument, warn};

use super::registry::SystemRegistry;

/// Timeouts applied to adapter connection calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub connect_timeout: Duration,
    pub test_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ConnectionSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            test_timeout: Duration::from_secs(config.test_connection_timeout_secs),
        }
    }
}

/// Statuses from which a connect attempt may start.
const CONNECTABLE: [SystemStatus; 2] = [SystemStatus::Inactive, SystemStatus::Error];

/// Connection lifecycle coordinator
pub struct ConnectionManager {
    registry: Arc<SystemRegistry>,
    settings: ConnectionSettings,
}

impl ConnectionManager {
    pub fn new(registry: Arc<SystemRegistry>, settings: ConnectionSettings) -> Self {
        Self { registry, settings }
    }

    /// Connect a system, optionally overriding parts of its configuration
    ///
    /// On success the merged configuration becomes the stored one. A `false`
    /// from the adapter leaves the system in `error` and returns `Ok(false)`;
    /// adapter errors and timeouts also land in `error` and are returned.
    ///
    /// # Errors
    ///
    /// - `SystemNotFound` for an unknown id
    /// - `Conflict` if the system is already active or connecting
    #[instrument(skip(self, config_override))]
    pub async fn connect(
        &self,
        id: &str,
        config_override: Option<ConnectionConfig>,
    ) -> Result<bool> {
        let bound = self.registry.bound(id).await?;

        let Some(previous) =
            self.registry.transition_status(id, &CONNECTABLE, SystemStatus::Connecting).await?
        else {
            return Err(SyncBridgeError::Conflict(format!(
                "system {id} is already {}",
                bound.system.status
            )));
        };

        let merged = match &config_override {
            Some(overrides) => bound.system.config.merged(overrides),
            None => bound.system.config.clone(),
        };

        info!(system_id = id, %previous, "Connecting integrated system");

        let attempt =
            tokio::time::timeout(self.settings.connect_timeout, bound.adapter.connect(&merged))
                .await;

        match attempt {
            Ok(Ok(true)) => {
                self.registry.persist_config(id, merged).await?;
                self.registry.set_status(id, SystemStatus::Active).await?;
                info!(system_id = id, "System connected");
                Ok(true)
            }
            Ok(Ok(false)) => {
                self.registry.set_status(id, SystemStatus::Error).await?;
                warn!(system_id = id, "Adapter rejected connection attempt");
                Ok(false)
            }
            Ok(Err(err)) => {
                self.mark_error(id).await;
                error!(system_id = id, error = %err, "Connection attempt failed");
                Err(err)
            }
            Err(_) => {
                self.mark_error(id).await;
                let seconds = self.settings.connect_timeout.as_secs();
                error!(system_id = id, timeout_secs = seconds, "Connection attempt timed out");
                Err(SyncBridgeError::SyncTimeout(seconds))
            }
        }
    }

    /// Disconnect a system
    ///
    /// Returns `false` (not an error) when the adapter fails to release its
    /// session; the system is then left in `error`.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, id: &str) -> Result<bool> {
        let bound = self.registry.bound(id).await?;

        if bound.adapter.is_connected() {
            if let Err(err) = bound.adapter.disconnect().await {
                warn!(system_id = id, error = %err, "Adapter disconnect failed");
                self.registry.set_status(id, SystemStatus::Error).await?;
                return Ok(false);
            }
        }

        self.registry.set_status(id, SystemStatus::Inactive).await?;
        info!(system_id = id, "System disconnected");
        Ok(true)
    }

    /// Probe connectivity without touching the lifecycle state
    ///
    /// Adapter failures and timeouts become a failed report with a zero
    /// response time; only an unknown id is an error.
    #[instrument(skip(self))]
    pub async fn test_connection(&self, id: &str) -> Result<ConnectionTestReport> {
        let bound = self.registry.bound(id).await?;
        let started = Instant::now();

        let report = match tokio::time::timeout(
            self.settings.test_timeout,
            bound.adapter.test_connection(),
        )
        .await
        {
            Ok(Ok(report)) => report,
            Ok(Err(err)) => {
                warn!(system_id = id, error = %err, "Connection test raised an error");
                ConnectionTestReport::failed(err.to_string(), 0)
            }
            Err(_) => {
                warn!(
                    system_id = id,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "Connection test timed out"
                );
                ConnectionTestReport::failed(
                    format!("connection test timed out after {:?}", self.settings.test_timeout),
                    0,
                )
            }
        };

        Ok(report)
    }

    // The system may have been removed mid-attempt; that is not a new failure.
    async fn mark_error(&self, id: &str) {
        if let Err(err) = self.registry.set_status(id, SystemStatus::Error).await {
            warn!(system_id = id, error = %err, "Could not record error status");
        }
    }
}
