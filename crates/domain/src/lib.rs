//! # SyncBridge Domain
//!
//! Business domain types and models for the commerce/ERP integration engine.
//!
//! This crate contains:
//! - Domain data types (IntegratedSystem, SyncJob, StatsReport, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other SyncBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
