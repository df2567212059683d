//! Sync job types
//!
//! A [`SyncJob`] is created `running` at submission and settles exactly once
//! into `completed`, `partial` or `failed`. After settlement it is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::system::DataType;

/// How much data a sync job exchanges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Full,
    Incremental,
    RealTime,
}

crate::impl_domain_status_conversions!(SyncMode {
    Full => "full",
    Incremental => "incremental",
    RealTime => "real_time",
});

impl SyncMode {
    /// Modes that only pull changes since the last sync watermark.
    pub fn uses_watermark(&self) -> bool {
        matches!(self, Self::Incremental | Self::RealTime)
    }
}

/// Sync job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SyncJobStatus {
    Running,
    Completed,
    Failed,
    Partial,
}

crate::impl_domain_status_conversions!(SyncJobStatus {
    Running => "running",
    Completed => "completed",
    Failed => "failed",
    Partial => "partial",
});

impl SyncJobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Caller-facing sync submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub system_id: String,
    #[serde(default)]
    pub sync_mode: SyncMode,
    pub data_types: Vec<DataType>,
    /// `None` uses the engine's default batch size.
    #[serde(default)]
    pub batch_size: Option<u32>,
}

impl SyncRequest {
    pub fn new(system_id: impl Into<String>, data_types: impl IntoIterator<Item = DataType>) -> Self {
        Self {
            system_id: system_id.into(),
            sync_mode: SyncMode::Full,
            data_types: data_types.into_iter().collect(),
            batch_size: None,
        }
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.sync_mode = mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// Options handed to an adapter's sync operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Registry id of the system being synced, for record sinks and logs.
    pub system_id: String,
    pub sync_mode: SyncMode,
    pub data_types: Vec<DataType>,
    pub batch_size: u32,
    /// Watermark for incremental modes: only records modified after it.
    pub since: Option<DateTime<Utc>>,
}

/// Counts and errors reported by an adapter sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub records_processed: u64,
    pub records_failed: u64,
    pub errors: Vec<String>,
}

impl SyncOutcome {
    /// Fold another partial outcome (e.g. one data type) into this one.
    pub fn absorb(&mut self, other: SyncOutcome) {
        self.records_processed = self.records_processed.saturating_add(other.records_processed);
        self.records_failed = self.records_failed.saturating_add(other.records_failed);
        self.errors.extend(other.errors);
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// One invocation of synchronization against one system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SyncJob {
    pub id: String,
    /// Weak link: resolved through the registry, may dangle after removal.
    pub system_id: String,
    pub sync_mode: SyncMode,
    pub status: SyncJobStatus,
    pub data_types: Vec<DataType>,
    pub batch_size: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "ts-gen", ts(type = "number | null"))]
    pub duration_ms: Option<u64>,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub records_processed: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub records_failed: u64,
    pub errors: Vec<String>,
}

impl SyncJob {
    /// New job in `running` state.
    pub fn start(
        id: impl Into<String>,
        system_id: impl Into<String>,
        sync_mode: SyncMode,
        data_types: Vec<DataType>,
        batch_size: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            system_id: system_id.into(),
            sync_mode,
            status: SyncJobStatus::Running,
            data_types,
            batch_size,
            started_at,
            ended_at: None,
            duration_ms: None,
            records_processed: 0,
            records_failed: 0,
            errors: Vec::new(),
        }
    }

    /// Record the terminal state.
    ///
    /// `Ok` with no errors is `completed` (an empty sync included), `Ok` with
    /// any error string is `partial`, `Err` is `failed`.
    pub fn settle(&mut self, result: Result<SyncOutcome, String>, ended_at: DateTime<Utc>) {
        match result {
            Ok(outcome) => {
                self.records_processed = outcome.records_processed;
                self.records_failed = outcome.records_failed;
                self.errors = outcome.errors;
                self.status = if self.errors.is_empty() {
                    SyncJobStatus::Completed
                } else {
                    SyncJobStatus::Partial
                };
            }
            Err(message) => {
                self.errors.push(message);
                self.status = SyncJobStatus::Failed;
            }
        }

        self.ended_at = Some(ended_at);
        let elapsed = (ended_at - self.started_at).num_milliseconds().max(0);
        self.duration_ms = Some(u64::try_from(elapsed).unwrap_or_default());
    }

    pub fn is_running(&self) -> bool {
        self.status == SyncJobStatus::Running
    }
}
