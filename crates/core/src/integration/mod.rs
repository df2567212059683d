//! External-system integration: adapter contract, registry and connection
//! lifecycle

pub mod connection;
pub mod ports;
pub mod registry;

pub use connection::{ConnectionManager, ConnectionSettings};
pub use ports::{AdapterFactory, RecordSink, SystemAdapter, SystemRepository};
pub use registry::{BoundSystem, SystemRegistry};
