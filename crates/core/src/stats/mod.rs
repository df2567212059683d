//! Windowed sync statistics computed on demand from history

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use syncbridge_domain::{
    IntegratedSystem, Result, StatsPeriod, StatsReport, SyncJob, SyncJobStatus, SystemSyncStats,
};
use tracing::{debug, instrument};

use crate::integration::registry::SystemRegistry;
use crate::sync::ports::SyncJobRepository;

/// Read-only reporting over sync history
pub struct StatsAggregator {
    registry: Arc<SystemRegistry>,
    jobs: Arc<dyn SyncJobRepository>,
}

impl StatsAggregator {
    pub fn new(registry: Arc<SystemRegistry>, jobs: Arc<dyn SyncJobRepository>) -> Self {
        Self { registry, jobs }
    }

    /// Report over the window ending now.
    pub async fn compute_stats(&self, period: StatsPeriod) -> Result<StatsReport> {
        self.compute_stats_at(period, Utc::now()).await
    }

    /// Report over the window ending at `now`
    ///
    /// Only settled jobs count; running jobs are not in history yet.
    #[instrument(skip(self))]
    pub async fn compute_stats_at(
        &self,
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> Result<StatsReport> {
        let window_start = period.window_start(now);
        let jobs: Vec<SyncJob> = self
            .jobs
            .history_since(window_start)
            .await?
            .into_iter()
            .filter(|job| job.started_at <= now)
            .collect();
        let systems = self.registry.list_all().await?;

        debug!(jobs = jobs.len(), systems = systems.len(), "Computing sync stats");
        Ok(aggregate(period, window_start, now, &jobs, &systems))
    }
}

/// Fold windowed jobs into a report
///
/// Every registered system gets a row even with no activity. Jobs of removed
/// systems still count towards the totals.
pub fn aggregate(
    period: StatsPeriod,
    window_start: DateTime<Utc>,
    generated_at: DateTime<Utc>,
    jobs: &[SyncJob],
    systems: &[IntegratedSystem],
) -> StatsReport {
    let mut report = StatsReport {
        period,
        window_start,
        generated_at,
        total_syncs: 0,
        successful_syncs: 0,
        failed_syncs: 0,
        partial_syncs: 0,
        total_records_processed: 0,
        total_records_failed: 0,
        success_rate: 0.0,
        average_duration_secs: 0.0,
        by_system: Vec::with_capacity(systems.len()),
        by_data_type: BTreeMap::new(),
    };

    let mut rows: Vec<SystemSyncStats> = systems
        .iter()
        .map(|system| SystemSyncStats {
            system_id: system.id.clone(),
            name: system.name.clone(),
            system_type: system.system_type,
            total_syncs: 0,
            successful_syncs: 0,
            failed_syncs: 0,
            records_processed: 0,
            last_sync_at: system.last_sync_at,
        })
        .collect();
    let row_index: HashMap<&str, usize> =
        systems.iter().enumerate().map(|(i, system)| (system.id.as_str(), i)).collect();

    let mut total_duration_ms: u64 = 0;

    for job in jobs {
        report.total_syncs += 1;
        report.total_records_processed += job.records_processed;
        report.total_records_failed += job.records_failed;
        total_duration_ms = total_duration_ms.saturating_add(job.duration_ms.unwrap_or_default());

        match job.status {
            SyncJobStatus::Completed => report.successful_syncs += 1,
            SyncJobStatus::Failed => report.failed_syncs += 1,
            SyncJobStatus::Partial => report.partial_syncs += 1,
            SyncJobStatus::Running => {}
        }

        if let Some(&i) = row_index.get(job.system_id.as_str()) {
            let row = &mut rows[i];
            row.total_syncs += 1;
            row.records_processed += job.records_processed;
            match job.status {
                SyncJobStatus::Completed => row.successful_syncs += 1,
                SyncJobStatus::Failed => row.failed_syncs += 1,
                _ => {}
            }
        }

        // Full count to every targeted type, not split.
        for data_type in &job.data_types {
            *report.by_data_type.entry(*data_type).or_insert(0) += job.records_processed;
        }
    }

    if report.total_syncs > 0 {
        let total = report.total_syncs as f64;
        report.success_rate = report.successful_syncs as f64 / total;
        report.average_duration_secs = total_duration_ms as f64 / total / 1000.0;
    }

    report.by_system = rows;
    report
}
