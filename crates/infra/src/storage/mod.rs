//! In-memory implementations of the storage ports
//!
//! Default storage for the engine and its tests. Nothing here survives a
//! process restart; durable backends plug in behind the same ports.

pub mod jobs;
pub mod sink;
pub mod systems;

pub use jobs::MemorySyncJobRepository;
pub use sink::{CountingRecordSink, DiscardRecordSink};
pub use systems::MemorySystemRepository;
