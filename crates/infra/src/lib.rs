//! # SyncBridge Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - In-memory system and sync-job repositories
//! - The adapter catalog and the built-in Shopify and Odoo adapters
//! - The retrying HTTP client those adapters share
//! - Configuration loading (environment, `.env`, JSON/TOML files)
//!
//! ## Architecture
//! - Implements traits defined in `syncbridge-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::{AdapterCatalog, OdooAdapter, ShopifyAdapter};
pub use storage::{CountingRecordSink, DiscardRecordSink, MemorySyncJobRepository, MemorySystemRepository};
