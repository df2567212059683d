//! Port interfaces for sync job tracking

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use syncbridge_domain::{Result, SyncJob};

/// Active set plus append-only history of sync jobs
///
/// A job id lives in at most one of the two at any time; implementations
/// must make [`SyncJobRepository::complete`] atomic with respect to readers.
#[async_trait]
pub trait SyncJobRepository: Send + Sync {
    /// Add a running job to the active set.
    async fn insert_active(&self, job: SyncJob) -> Result<()>;

    /// Look a job up in the active set first, then in history.
    async fn get(&self, id: &str) -> Result<Option<SyncJob>>;

    /// Snapshot of the active set.
    async fn list_active(&self) -> Result<Vec<SyncJob>>;

    /// Move a settled job from the active set to history.
    ///
    /// Fails with `NotFound` if the job is not active.
    async fn complete(&self, job: SyncJob) -> Result<()>;

    /// Drop a job from the active set without recording it in history.
    async fn remove_active(&self, id: &str) -> Result<Option<SyncJob>>;

    /// Historical jobs started at or after `since`, oldest first.
    async fn history_since(&self, since: DateTime<Utc>) -> Result<Vec<SyncJob>>;

    /// Drop history entries started before `older_than`, then the oldest
    /// entries beyond `max_entries`. Returns how many were dropped.
    async fn prune_history(&self, older_than: DateTime<Utc>, max_entries: usize) -> Result<usize>;
}
