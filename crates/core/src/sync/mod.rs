//! Sync job submission, settlement and tracking

pub mod engine;
pub mod ports;

pub use engine::{SyncEngine, SyncEngineSettings};
pub use ports::SyncJobRepository;
