//! Built-in adapters and the catalog that instantiates them
//!
//! Adding a system type is a pure addition: implement
//! [`syncbridge_core::SystemAdapter`] and register a constructor with
//! [`AdapterCatalog::register`].

pub mod catalog;
pub mod odoo;
pub mod shopify;

use serde_json::Value;
use syncbridge_core::RecordSink;
use syncbridge_domain::{DataType, SyncBridgeError, SyncOutcome};
use tracing::warn;

pub use catalog::AdapterCatalog;
pub use odoo::OdooAdapter;
pub use shopify::ShopifyAdapter;

/// Errors that mean "could not reach or log into the remote system" rather
/// than a fault in the engine or the configuration.
pub(crate) fn is_connectivity_failure(err: &SyncBridgeError) -> bool {
    matches!(
        err,
        SyncBridgeError::Auth(_)
            | SyncBridgeError::Network(_)
            | SyncBridgeError::NotFound(_)
            | SyncBridgeError::SyncTimeout(_)
    )
}

/// Hand one fetched page to the sink and account for it.
///
/// A rejected batch counts every record in it as failed; the sync carries on.
pub(crate) async fn deliver_batch(
    sink: &dyn RecordSink,
    system_id: &str,
    data_type: DataType,
    records: &[Value],
    outcome: &mut SyncOutcome,
) {
    let count = records.len() as u64;
    match sink.write_batch(system_id, data_type, records).await {
        Ok(()) => {
            outcome.records_processed = outcome.records_processed.saturating_add(count);
        }
        Err(err) => {
            warn!(system_id, %data_type, count, error = %err, "record sink rejected batch");
            outcome.records_failed = outcome.records_failed.saturating_add(count);
            outcome.record_error(format!("{data_type}: failed to store batch of {count}: {err}"));
        }
    }
}
