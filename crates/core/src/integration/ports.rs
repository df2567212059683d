//! Port interfaces for external-system integration

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use syncbridge_domain::{
    ConnectionConfig, ConnectionTestReport, DataType, IntegratedSystem, Result, SyncOptions,
    SyncOutcome, SystemStatus, SystemType,
};

/// Capability contract every integrated external system implements
///
/// One instance is bound to one registered system for the system's lifetime.
/// Implementations hold their own session state behind interior mutability.
#[async_trait]
pub trait SystemAdapter: Send + Sync {
    /// External-system type this adapter speaks.
    fn system_type(&self) -> SystemType;

    /// Data types this adapter can synchronize.
    fn capabilities(&self) -> &[DataType];

    /// Establish a session.
    ///
    /// Ordinary authentication and network failures are `Ok(false)`. `Err` is
    /// reserved for configuration problems and unexpected faults.
    async fn connect(&self, config: &ConnectionConfig) -> Result<bool>;

    /// Release the session. Calling it while disconnected is a no-op.
    async fn disconnect(&self) -> Result<()>;

    /// Current session state, without side effects.
    fn is_connected(&self) -> bool;

    /// Lightweight round-trip probe that never alters the session state.
    ///
    /// Failures belong in the report; `Err` only for unexpected faults.
    async fn test_connection(&self) -> Result<ConnectionTestReport>;

    /// Exchange data in batches.
    ///
    /// Per-record problems are reported in the outcome's error list; `Err`
    /// fails the whole job.
    async fn sync(&self, options: &SyncOptions) -> Result<SyncOutcome>;
}

/// Instantiates the adapter for a system type at registration time
pub trait AdapterFactory: Send + Sync {
    /// Build a fresh adapter seeded with the system's stored configuration.
    ///
    /// Fails with `UnsupportedSystemType` when no adapter is registered.
    fn create(
        &self,
        system_type: SystemType,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn SystemAdapter>>;

    /// System types that `create` accepts.
    fn supported_types(&self) -> Vec<SystemType>;
}

/// Write-through target for records pulled by adapters
///
/// The engine never persists business records itself; consumers plug their
/// storage in here.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one fetched batch. `Err` marks the whole batch as failed.
    async fn write_batch(
        &self,
        system_id: &str,
        data_type: DataType,
        records: &[Value],
    ) -> Result<()>;
}

/// Storage for integrated-system records
#[async_trait]
pub trait SystemRepository: Send + Sync {
    /// Store a new record; fails with `Conflict` if the id is taken.
    async fn insert(&self, system: IntegratedSystem) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<IntegratedSystem>>;

    /// All records in registration order.
    async fn list(&self) -> Result<Vec<IntegratedSystem>>;

    /// Delete a record, returning it if it existed.
    async fn remove(&self, id: &str) -> Result<Option<IntegratedSystem>>;

    /// Unconditionally set the lifecycle status.
    async fn set_status(&self, id: &str, status: SystemStatus) -> Result<()>;

    /// Set the status only if the current one is in `allowed_from`.
    ///
    /// Returns the previous status when applied and `None` when the current
    /// status did not allow the transition.
    async fn transition_status(
        &self,
        id: &str,
        allowed_from: &[SystemStatus],
        to: SystemStatus,
    ) -> Result<Option<SystemStatus>>;

    async fn set_config(&self, id: &str, config: ConnectionConfig) -> Result<()>;

    /// Move the last-sync timestamp forward (never backwards).
    async fn set_last_sync(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Move the incremental-sync watermark forward (never backwards).
    async fn set_sync_watermark(&self, id: &str, at: DateTime<Utc>) -> Result<()>;
}
