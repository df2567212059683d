//! # SyncBridge Core
//!
//! Integration and sync orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for adapters, record sinks and storage
//! - The system registry and connection lifecycle
//! - The asynchronous sync engine
//! - Windowed statistics
//!
//! ## Architecture Principles
//! - Only depends on `syncbridge-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod integration;
pub mod stats;
pub mod sync;

pub use integration::ports::{AdapterFactory, RecordSink, SystemAdapter, SystemRepository};
pub use integration::{BoundSystem, ConnectionManager, ConnectionSettings, SystemRegistry};
pub use stats::StatsAggregator;
pub use sync::ports::SyncJobRepository;
pub use sync::{SyncEngine, SyncEngineSettings};
