//! Sync engine - non-blocking job submission and supervised settlement
//!
//! `start_sync` validates the request, records a `running` job and returns
//! immediately. The adapter call runs on a detached task tracked by a
//! [`TaskTracker`]; whatever happens to it (success, error, panic, timeout or
//! shutdown) the job is settled exactly once and moved into history.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use syncbridge_domain::constants::{
    ADAPTER_PANIC_PREFIX, HISTORY_WRITE_ATTEMPTS, HISTORY_WRITE_BACKOFF_MS,
    SHUTDOWN_JOIN_TIMEOUT_SECS, SYNC_CANCELLED_MESSAGE,
};
use syncbridge_domain::{
    dedup_data_types, Config, Result, SyncBridgeError, SyncConcurrency, SyncJob, SyncJobStatus,
    SyncOptions, SyncOutcome, SyncRequest,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::ports::SyncJobRepository;
use crate::integration::ports::SystemAdapter;
use crate::integration::registry::SystemRegistry;

/// Engine tunables, usually derived from [`Config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEngineSettings {
    /// `None` lets adapter calls run unbounded.
    pub sync_timeout: Option<Duration>,
    pub default_batch_size: u32,
    pub max_batch_size: u32,
    pub concurrency: SyncConcurrency,
    pub history_retention: chrono::Duration,
    pub history_max_entries: usize,
}

impl Default for SyncEngineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SyncEngineSettings {
    fn from(config: &Config) -> Self {
        let engine = &config.engine;
        Self {
            sync_timeout: (engine.sync_timeout_secs > 0)
                .then(|| Duration::from_secs(engine.sync_timeout_secs)),
            default_batch_size: engine.default_batch_size,
            max_batch_size: engine.max_batch_size,
            concurrency: engine.concurrency,
            history_retention: chrono::Duration::days(i64::from(config.history.retention_days)),
            history_max_entries: config.history.max_entries,
        }
    }
}

/// State shared between the engine handle and its settlement tasks
struct EngineShared {
    registry: Arc<SystemRegistry>,
    jobs: Arc<dyn SyncJobRepository>,
    settings: SyncEngineSettings,
    /// Systems with a running job under `exclusive_per_system`.
    claimed: Mutex<HashSet<String>>,
    settled: Notify,
}

/// Exclusive hold on a system for the lifetime of one job; released on drop.
struct SystemClaim {
    shared: Arc<EngineShared>,
    system_id: Option<String>,
}

impl Drop for SystemClaim {
    fn drop(&mut self) {
        if let Some(id) = self.system_id.take() {
            self.shared.claimed.lock().remove(&id);
        }
    }
}

/// Asynchronous sync orchestrator
pub struct SyncEngine {
    shared: Arc<EngineShared>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl SyncEngine {
    pub fn new(
        registry: Arc<SystemRegistry>,
        jobs: Arc<dyn SyncJobRepository>,
        settings: SyncEngineSettings,
    ) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                registry,
                jobs,
                settings,
                claimed: Mutex::new(HashSet::new()),
                settled: Notify::new(),
            }),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Submit a sync job and return its `running` handle without waiting
    ///
    /// Failures after submission never reach the caller; they are recorded
    /// on the job itself.
    ///
    /// # Errors
    ///
    /// - `SystemNotFound` for an unknown system
    /// - `SystemNotConnected` if the adapter has no live session
    /// - `InvalidInput` for an empty type list, an out-of-range batch size or
    ///   a data type the system does not declare
    /// - `Conflict` if the system already has a running job under the
    ///   exclusive policy, or the engine is shutting down
    #[instrument(skip(self, request), fields(system_id = %request.system_id, mode = %request.sync_mode))]
    pub async fn start_sync(&self, request: SyncRequest) -> Result<SyncJob> {
        if self.shutdown.is_cancelled() {
            return Err(SyncBridgeError::Conflict("sync engine is shutting down".into()));
        }

        let batch_size = self.resolve_batch_size(request.batch_size)?;
        let data_types = dedup_data_types(&request.data_types);
        if data_types.is_empty() {
            return Err(SyncBridgeError::InvalidInput(
                "at least one data type is required".into(),
            ));
        }

        let bound = self.shared.registry.bound(&request.system_id).await?;
        if !bound.adapter.is_connected() {
            return Err(SyncBridgeError::SystemNotConnected(request.system_id));
        }
        if let Some(missing) = data_types.iter().find(|dt| !bound.system.supports(**dt)) {
            return Err(SyncBridgeError::InvalidInput(format!(
                "system {} does not declare feature '{missing}'",
                bound.system.id
            )));
        }

        let claim = self.claim(&bound.system.id)?;

        let since =
            if request.sync_mode.uses_watermark() { bound.system.sync_watermark } else { None };
        let job = SyncJob::start(
            Uuid::now_v7().to_string(),
            bound.system.id.clone(),
            request.sync_mode,
            data_types.clone(),
            batch_size,
            Utc::now(),
        );
        self.shared.jobs.insert_active(job.clone()).await?;

        let options = SyncOptions {
            system_id: bound.system.id.clone(),
            sync_mode: request.sync_mode,
            data_types,
            batch_size,
            since,
        };

        info!(job_id = %job.id, batch_size, "Sync job submitted");

        self.tracker.spawn(settle(
            Arc::clone(&self.shared),
            job.clone(),
            bound.adapter,
            options,
            self.shutdown.child_token(),
            claim,
        ));

        Ok(job)
    }

    /// Active job first, then history; `None` if the id was never issued.
    pub async fn get_sync_status(&self, job_id: &str) -> Result<Option<SyncJob>> {
        self.shared.jobs.get(job_id).await
    }

    pub async fn list_active_syncs(&self) -> Result<Vec<SyncJob>> {
        self.shared.jobs.list_active().await
    }

    /// Resolve once the job has settled into history
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown job id
    /// - `SyncTimeout` if the job is still running when `timeout` elapses
    pub async fn wait_for_settlement(&self, job_id: &str, timeout: Duration) -> Result<SyncJob> {
        let wait = async {
            loop {
                // Register interest before reading so a settlement between the
                // read and the await is not missed.
                let notified = self.shared.settled.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                match self.shared.jobs.get(job_id).await? {
                    None => {
                        return Err(SyncBridgeError::NotFound(format!("sync job {job_id}")));
                    }
                    Some(job) if !job.is_running() => return Ok(job),
                    Some(_) => notified.await,
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| SyncBridgeError::SyncTimeout(timeout.as_secs()))?
    }

    /// Cancel in-flight jobs and wait for their settlement tasks
    ///
    /// Cancelled jobs settle as `failed`. New submissions are rejected from
    /// the moment this is called.
    pub async fn shutdown(&self) -> Result<()> {
        info!(in_flight = self.tracker.len(), "Shutting down sync engine");
        self.shutdown.cancel();
        self.tracker.close();

        let limit = Duration::from_secs(SHUTDOWN_JOIN_TIMEOUT_SECS);
        if tokio::time::timeout(limit, self.tracker.wait()).await.is_err() {
            warn!(remaining = self.tracker.len(), "Settlement tasks did not finish in time");
            return Err(SyncBridgeError::SyncTimeout(SHUTDOWN_JOIN_TIMEOUT_SECS));
        }

        info!("Sync engine stopped");
        Ok(())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn resolve_batch_size(&self, requested: Option<u32>) -> Result<u32> {
        let settings = &self.shared.settings;
        let batch_size = requested.unwrap_or(settings.default_batch_size);
        if batch_size == 0 || batch_size > settings.max_batch_size {
            return Err(SyncBridgeError::InvalidInput(format!(
                "batch size must be between 1 and {}, got {batch_size}",
                settings.max_batch_size
            )));
        }
        Ok(batch_size)
    }

    fn claim(&self, system_id: &str) -> Result<SystemClaim> {
        let shared = Arc::clone(&self.shared);
        if shared.settings.concurrency == SyncConcurrency::Parallel {
            return Ok(SystemClaim { shared, system_id: None });
        }

        if !shared.claimed.lock().insert(system_id.to_string()) {
            return Err(SyncBridgeError::Conflict(format!(
                "system {system_id} already has a running sync"
            )));
        }
        Ok(SystemClaim { shared, system_id: Some(system_id.to_string()) })
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if !self.shutdown.is_cancelled() && !self.tracker.is_empty() {
            warn!(in_flight = self.tracker.len(), "Sync engine dropped with running jobs");
            self.shutdown.cancel();
        }
    }
}

// =============================================================================
// Settlement
// =============================================================================

async fn settle(
    shared: Arc<EngineShared>,
    mut job: SyncJob,
    adapter: Arc<dyn SystemAdapter>,
    options: SyncOptions,
    cancel: CancellationToken,
    claim: SystemClaim,
) {
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SYNC_CANCELLED_MESSAGE.to_string()),
        result = guarded_sync(adapter.as_ref(), &options, shared.settings.sync_timeout) => result,
    };

    let ended_at = Utc::now();
    job.settle(result, ended_at);

    info!(
        job_id = %job.id,
        system_id = %job.system_id,
        status = %job.status,
        records_processed = job.records_processed,
        records_failed = job.records_failed,
        duration_ms = job.duration_ms.unwrap_or_default(),
        "Sync job settled"
    );

    let watermark = (job.status == SyncJobStatus::Completed).then_some(job.started_at);
    match shared.registry.record_sync(&job.system_id, ended_at, watermark).await {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {
            debug!(system_id = %job.system_id, "System removed before its job settled");
        }
        Err(err) => warn!(system_id = %job.system_id, error = %err, "Failed to record last sync"),
    }

    archive(&shared, job).await;

    let cutoff = ended_at - shared.settings.history_retention;
    match shared.jobs.prune_history(cutoff, shared.settings.history_max_entries).await {
        Ok(0) => {}
        Ok(pruned) => debug!(pruned, "Pruned sync history"),
        Err(err) => warn!(error = %err, "Failed to prune sync history"),
    }

    drop(claim);
    shared.settled.notify_waiters();
}

/// Move a settled job into history, retrying storage failures
///
/// A job that still cannot be recorded is evicted from the active set so it
/// does not read as running forever.
async fn archive(shared: &EngineShared, job: SyncJob) {
    let job_id = job.id.clone();

    for attempt in 1..=HISTORY_WRITE_ATTEMPTS {
        match shared.jobs.complete(job.clone()).await {
            Ok(()) => return,
            Err(err) if err.is_not_found() => {
                warn!(job_id = %job_id, "Settled job was no longer active");
                return;
            }
            Err(err) => {
                warn!(job_id = %job_id, attempt, error = %err, "Failed to move settled job into history");
                if attempt < HISTORY_WRITE_ATTEMPTS {
                    let delay = HISTORY_WRITE_BACKOFF_MS * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    match shared.jobs.remove_active(&job_id).await {
        Ok(_) => error!(job_id = %job_id, status = %job.status, "Settled job evicted without a history record"),
        Err(err) => error!(job_id = %job_id, error = %err, "Failed to evict unrecorded job"),
    }
}

/// Run the adapter behind the panic boundary and the per-job timeout.
async fn guarded_sync(
    adapter: &dyn SystemAdapter,
    options: &SyncOptions,
    timeout: Option<Duration>,
) -> std::result::Result<SyncOutcome, String> {
    let call = AssertUnwindSafe(adapter.sync(options)).catch_unwind();

    let caught = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(caught) => caught,
            Err(_) => return Err(format!("sync timed out after {}ms", limit.as_millis())),
        },
        None => call.await,
    };

    match caught {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("{ADAPTER_PANIC_PREFIX}: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
