//! Domain types and models
//!
//! - `system`: integrated systems, their lifecycle status and configuration
//! - `sync`: sync requests, adapter options/outcomes and job records
//! - `stats`: windowed sync statistics

pub mod stats;
pub mod sync;
pub mod system;

pub use stats::{StatsPeriod, StatsReport, SystemSyncStats};
pub use sync::{SyncJob, SyncJobStatus, SyncMode, SyncOptions, SyncOutcome, SyncRequest};
pub use system::{
    dedup_data_types, ConnectionConfig, ConnectionTestReport, DataType, IntegratedSystem,
    NewSystem, SystemCategory, SystemStatus, SystemType,
};
