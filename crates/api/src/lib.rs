//! # SyncBridge App
//!
//! Composition root and transport-agnostic command layer.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Commands mapping 1:1 onto the system, connection and sync operations
//! - Logging initialization
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - A REST or RPC facade calls the commands and forwards `CommandError`
//!   status codes unchanged

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
