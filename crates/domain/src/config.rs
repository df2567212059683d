//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HISTORY_MAX_ENTRIES,
    DEFAULT_HISTORY_RETENTION_DAYS, DEFAULT_HTTP_BACKOFF_MS, DEFAULT_HTTP_MAX_ATTEMPTS,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SYNC_TIMEOUT_SECS, DEFAULT_TEST_CONNECTION_TIMEOUT_SECS,
    MAX_BATCH_SIZE, MIN_HISTORY_RETENTION_DAYS,
};
use crate::errors::{Result, SyncBridgeError};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub history: HistoryConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject settings that would break engine invariants.
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        if engine.default_batch_size == 0 || engine.max_batch_size == 0 {
            return Err(SyncBridgeError::Config("batch sizes must be greater than zero".into()));
        }
        if engine.default_batch_size > engine.max_batch_size {
            return Err(SyncBridgeError::Config(format!(
                "default_batch_size ({}) exceeds max_batch_size ({})",
                engine.default_batch_size, engine.max_batch_size
            )));
        }
        if self.history.retention_days < MIN_HISTORY_RETENTION_DAYS {
            return Err(SyncBridgeError::Config(format!(
                "history retention must be at least {} days to cover the monthly stats window",
                MIN_HISTORY_RETENTION_DAYS
            )));
        }
        if self.history.max_entries == 0 {
            return Err(SyncBridgeError::Config("history max_entries must be positive".into()));
        }
        if self.http.max_attempts == 0 {
            return Err(SyncBridgeError::Config("http max_attempts must be positive".into()));
        }
        Ok(())
    }
}

/// Whether jobs against the same system may overlap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncConcurrency {
    /// Any number of jobs per system; adapters must tolerate parallel syncs.
    #[default]
    Parallel,
    /// At most one running job per system; extra submissions are rejected.
    ExclusivePerSystem,
}

crate::impl_domain_status_conversions!(SyncConcurrency {
    Parallel => "parallel",
    ExclusivePerSystem => "exclusive_per_system",
});

/// Sync engine and connection manager settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-job budget; `0` disables the timeout.
    pub sync_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub test_connection_timeout_secs: u64,
    pub default_batch_size: u32,
    pub max_batch_size: u32,
    pub concurrency: SyncConcurrency,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sync_timeout_secs: DEFAULT_SYNC_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            test_connection_timeout_secs: DEFAULT_TEST_CONNECTION_TIMEOUT_SECS,
            default_batch_size: DEFAULT_BATCH_SIZE,
            max_batch_size: MAX_BATCH_SIZE,
            concurrency: SyncConcurrency::Parallel,
        }
    }
}

/// Sync history retention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub retention_days: u32,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_HISTORY_RETENTION_DAYS,
            max_entries: DEFAULT_HISTORY_MAX_ENTRIES,
        }
    }
}

/// HTTP settings shared by the built-in adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_HTTP_BACKOFF_MS,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
