//! Engine constants
//!
//! Centralized location for domain-level defaults used throughout the engine.

// Sync request defaults
pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const MAX_BATCH_SIZE: u32 = 1_000;

// Timeout budgets (seconds)
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TEST_CONNECTION_TIMEOUT_SECS: u64 = 10;
pub const SHUTDOWN_JOIN_TIMEOUT_SECS: u64 = 5;

// History retention; must cover the widest stats window (one calendar month)
pub const MIN_HISTORY_RETENTION_DAYS: u32 = 31;
pub const DEFAULT_HISTORY_RETENTION_DAYS: u32 = 31;
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 10_000;

// Adapter HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BACKOFF_MS: u64 = 200;

// Settled jobs whose history write keeps failing are evicted after this many tries
pub const HISTORY_WRITE_ATTEMPTS: u32 = 3;
pub const HISTORY_WRITE_BACKOFF_MS: u64 = 50;

// Error messages attached to force-finalized jobs
pub const SYNC_CANCELLED_MESSAGE: &str = "sync cancelled: engine shutting down";
pub const ADAPTER_PANIC_PREFIX: &str = "adapter panicked";
