//! Mock repository implementations for testing
//!
//! In-memory versions of the core storage ports, enabling deterministic
//! tests without any infrastructure crate.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use syncbridge_core::{SyncJobRepository, SystemRepository};
use syncbridge_domain::{
    ConnectionConfig, IntegratedSystem, Result, SyncBridgeError, SyncJob, SystemStatus,
};

/// In-memory mock for `SystemRepository`, keeping registration order.
#[derive(Default)]
pub struct MockSystemRepository {
    systems: Mutex<Vec<IntegratedSystem>>,
}

impl MockSystemRepository {
    fn update<F>(&self, id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut IntegratedSystem),
    {
        let mut systems = self.systems.lock();
        let system = systems
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SyncBridgeError::SystemNotFound(id.to_string()))?;
        apply(system);
        Ok(())
    }
}

#[async_trait]
impl SystemRepository for MockSystemRepository {
    async fn insert(&self, system: IntegratedSystem) -> Result<()> {
        let mut systems = self.systems.lock();
        if systems.iter().any(|s| s.id == system.id) {
            return Err(SyncBridgeError::Conflict(format!("duplicate id {}", system.id)));
        }
        systems.push(system);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<IntegratedSystem>> {
        Ok(self.systems.lock().iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<IntegratedSystem>> {
        Ok(self.systems.lock().clone())
    }

    async fn remove(&self, id: &str) -> Result<Option<IntegratedSystem>> {
        let mut systems = self.systems.lock();
        let index = systems.iter().position(|s| s.id == id);
        Ok(index.map(|i| systems.remove(i)))
    }

    async fn set_status(&self, id: &str, status: SystemStatus) -> Result<()> {
        self.update(id, |s| s.status = status)
    }

    async fn transition_status(
        &self,
        id: &str,
        allowed_from: &[SystemStatus],
        to: SystemStatus,
    ) -> Result<Option<SystemStatus>> {
        let mut previous = None;
        self.update(id, |s| {
            if allowed_from.contains(&s.status) {
                previous = Some(s.status);
                s.status = to;
            }
        })?;
        Ok(previous)
    }

    async fn set_config(&self, id: &str, config: ConnectionConfig) -> Result<()> {
        self.update(id, |s| s.config = config)
    }

    async fn set_last_sync(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.update(id, |s| {
            if s.last_sync_at.map_or(true, |current| at > current) {
                s.last_sync_at = Some(at);
            }
        })
    }

    async fn set_sync_watermark(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.update(id, |s| {
            if s.sync_watermark.map_or(true, |current| at > current) {
                s.sync_watermark = Some(at);
            }
        })
    }
}

#[derive(Default)]
struct JobState {
    active: HashMap<String, SyncJob>,
    history: Vec<SyncJob>,
}

/// In-memory mock for `SyncJobRepository`.
#[derive(Default)]
pub struct MockSyncJobRepository {
    state: Mutex<JobState>,
    complete_failures: Mutex<usize>,
}

impl MockSyncJobRepository {
    pub fn history(&self) -> Vec<SyncJob> {
        self.state.lock().history.clone()
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Make the next `count` history writes fail.
    pub fn fail_next_completes(&self, count: usize) {
        *self.complete_failures.lock() = count;
    }

    /// Seed a settled job directly into history.
    pub fn push_history(&self, job: SyncJob) {
        self.state.lock().history.push(job);
    }
}

#[async_trait]
impl SyncJobRepository for MockSyncJobRepository {
    async fn insert_active(&self, job: SyncJob) -> Result<()> {
        self.state.lock().active.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SyncJob>> {
        let state = self.state.lock();
        Ok(state
            .active
            .get(id)
            .or_else(|| state.history.iter().find(|job| job.id == id))
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<SyncJob>> {
        Ok(self.state.lock().active.values().cloned().collect())
    }

    async fn complete(&self, job: SyncJob) -> Result<()> {
        {
            let mut failures = self.complete_failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(SyncBridgeError::Internal("history store unavailable".into()));
            }
        }
        let mut state = self.state.lock();
        if state.active.remove(&job.id).is_none() {
            return Err(SyncBridgeError::NotFound(format!("active sync job {}", job.id)));
        }
        state.history.push(job);
        Ok(())
    }

    async fn remove_active(&self, id: &str) -> Result<Option<SyncJob>> {
        Ok(self.state.lock().active.remove(id))
    }

    async fn history_since(&self, since: DateTime<Utc>) -> Result<Vec<SyncJob>> {
        Ok(self.state.lock().history.iter().filter(|job| job.started_at >= since).cloned().collect())
    }

    async fn prune_history(&self, older_than: DateTime<Utc>, max_entries: usize) -> Result<usize> {
        let mut state = self.state.lock();
        let before = state.history.len();
        state.history.retain(|job| job.started_at >= older_than);
        let overflow = state.history.len().saturating_sub(max_entries);
        state.history.drain(..overflow);
        Ok(before - state.history.len())
    }
}
