//! Process-memory sync job tracking

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use syncbridge_core::SyncJobRepository;
use syncbridge_domain::{Result, SyncBridgeError, SyncJob};
use tracing::debug;

#[derive(Default)]
struct Ledger {
    active: HashMap<String, SyncJob>,
    /// Settled jobs ordered by `started_at`.
    history: Vec<SyncJob>,
}

/// `SyncJobRepository` keeping the active set and history under one lock
///
/// Holding both behind the same lock makes `complete` a single step for
/// readers: a job is always visible in exactly one of the two.
#[derive(Default)]
pub struct MemorySyncJobRepository {
    ledger: RwLock<Ledger>,
}

impl MemorySyncJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_len(&self) -> usize {
        self.ledger.read().active.len()
    }

    pub fn history_len(&self) -> usize {
        self.ledger.read().history.len()
    }
}

#[async_trait]
impl SyncJobRepository for MemorySyncJobRepository {
    async fn insert_active(&self, job: SyncJob) -> Result<()> {
        let mut ledger = self.ledger.write();
        if ledger.active.contains_key(&job.id) || ledger.history.iter().any(|j| j.id == job.id) {
            return Err(SyncBridgeError::Conflict(format!("sync job {} already exists", job.id)));
        }
        ledger.active.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SyncJob>> {
        let ledger = self.ledger.read();
        Ok(ledger
            .active
            .get(id)
            .or_else(|| ledger.history.iter().rev().find(|job| job.id == id))
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<SyncJob>> {
        let mut jobs: Vec<SyncJob> = self.ledger.read().active.values().cloned().collect();
        jobs.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn complete(&self, job: SyncJob) -> Result<()> {
        let mut ledger = self.ledger.write();
        if ledger.active.remove(&job.id).is_none() {
            return Err(SyncBridgeError::NotFound(format!("active sync job {}", job.id)));
        }
        let at = ledger.history.partition_point(|existing| existing.started_at <= job.started_at);
        ledger.history.insert(at, job);
        Ok(())
    }

    async fn remove_active(&self, id: &str) -> Result<Option<SyncJob>> {
        Ok(self.ledger.write().active.remove(id))
    }

    async fn history_since(&self, since: DateTime<Utc>) -> Result<Vec<SyncJob>> {
        let ledger = self.ledger.read();
        let start = ledger.history.partition_point(|job| job.started_at < since);
        Ok(ledger.history[start..].to_vec())
    }

    async fn prune_history(&self, older_than: DateTime<Utc>, max_entries: usize) -> Result<usize> {
        let mut ledger = self.ledger.write();
        let expired = ledger.history.partition_point(|job| job.started_at < older_than);
        let overflow = (ledger.history.len() - expired).saturating_sub(max_entries);
        let dropped = expired + overflow;
        if dropped > 0 {
            ledger.history.drain(..dropped);
            debug!(dropped, remaining = ledger.history.len(), "pruned sync history");
        }
        Ok(dropped)
    }
}
