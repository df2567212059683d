//! Record sinks that do not persist business data

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use syncbridge_core::RecordSink;
use syncbridge_domain::{DataType, Result};
use tracing::trace;

/// Accepts and drops every batch. Adapters still count what they fetched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardRecordSink;

#[async_trait]
impl RecordSink for DiscardRecordSink {
    async fn write_batch(&self, system_id: &str, data_type: DataType, records: &[Value]) -> Result<()> {
        trace!(system_id, %data_type, count = records.len(), "discarding fetched batch");
        Ok(())
    }
}

/// Drops batches but keeps a running total of records written
#[derive(Debug, Default)]
pub struct CountingRecordSink {
    records: AtomicU64,
    batches: AtomicU64,
}

impl CountingRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordSink for CountingRecordSink {
    async fn write_batch(&self, _system_id: &str, _data_type: DataType, records: &[Value]) -> Result<()> {
        self.records.fetch_add(records.len() as u64, Ordering::Relaxed);
        self.batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
