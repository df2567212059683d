//! Odoo ERP adapter over the external JSON-RPC API

mod adapter;
mod rpc;

pub use adapter::OdooAdapter;
