//! Error plumbing between third-party crates and the domain error

pub mod conversions;

pub use conversions::InfraError;
