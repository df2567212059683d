//! Integration tests for windowed statistics
//!
//! **Coverage:**
//! - Window filtering by job start time for each period
//! - Zero-activity systems still reported
//! - Undivided per-data-type attribution

mod support;

use chrono::{Duration, TimeZone, Utc};
use support::Harness;
use syncbridge_domain::{DataType, StatsPeriod, SyncJob, SyncMode, SyncOutcome};

fn settled_job(
    id: &str,
    system_id: &str,
    started_at: chrono::DateTime<Utc>,
    data_types: Vec<DataType>,
    records: u64,
) -> SyncJob {
    let mut job = SyncJob::start(id, system_id, SyncMode::Full, data_types, 100, started_at);
    job.settle(
        Ok(SyncOutcome { records_processed: records, ..SyncOutcome::default() }),
        started_at + Duration::seconds(4),
    );
    job
}

#[tokio::test]
async fn empty_history_yields_zero_rates() {
    let harness = Harness::new();

    let report = harness.stats.compute_stats(StatsPeriod::Day).await.unwrap();

    assert_eq!(report.total_syncs, 0);
    assert_eq!(report.success_rate, 0.0);
    assert_eq!(report.average_duration_secs, 0.0);
    assert!(report.by_data_type.is_empty());
}

#[tokio::test]
async fn windows_filter_by_start_time() {
    let harness = Harness::new();
    let (system, _) = harness.register(&[DataType::Products]).await;
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

    for (id, age) in [
        ("hour", Duration::hours(1)),
        ("three-days", Duration::days(3)),
        ("twenty-days", Duration::days(20)),
        ("forty-days", Duration::days(40)),
    ] {
        harness.jobs.push_history(settled_job(
            id,
            &system.id,
            now - age,
            vec![DataType::Products],
            1,
        ));
    }

    let day = harness.stats.compute_stats_at(StatsPeriod::Day, now).await.unwrap();
    let week = harness.stats.compute_stats_at(StatsPeriod::Week, now).await.unwrap();
    let month = harness.stats.compute_stats_at(StatsPeriod::Month, now).await.unwrap();

    assert_eq!(day.total_syncs, 1);
    assert_eq!(week.total_syncs, 2);
    assert_eq!(month.total_syncs, 3);
    assert_eq!(month.window_start, Utc.with_ymd_and_hms(2025, 5, 15, 12, 0, 0).unwrap());
    assert!((month.average_duration_secs - 4.0).abs() < f64::EPSILON);
    assert!((month.success_rate - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn every_registered_system_is_reported() {
    let harness = Harness::new();
    let (busy, _) = harness.register(&[DataType::Products]).await;
    let (idle, _) = harness.register(&[DataType::Products]).await;
    harness.jobs.push_history(settled_job(
        "job-1",
        &busy.id,
        Utc::now() - Duration::minutes(5),
        vec![DataType::Products],
        8,
    ));

    let report = harness.stats.compute_stats(StatsPeriod::Day).await.unwrap();

    assert_eq!(report.by_system.len(), 2);
    let idle_row = report.by_system.iter().find(|row| row.system_id == idle.id).unwrap();
    assert_eq!(idle_row.total_syncs, 0);
    assert_eq!(idle_row.records_processed, 0);
    let busy_row = report.by_system.iter().find(|row| row.system_id == busy.id).unwrap();
    assert_eq!(busy_row.successful_syncs, 1);
    assert_eq!(busy_row.records_processed, 8);
}

#[tokio::test]
async fn multi_type_job_counts_in_full_for_each_type() {
    let harness = Harness::new();
    let (system, _) = harness.register(&[DataType::Products, DataType::Orders]).await;
    harness.jobs.push_history(settled_job(
        "job-1",
        &system.id,
        Utc::now() - Duration::minutes(1),
        vec![DataType::Products, DataType::Orders],
        5,
    ));

    let report = harness.stats.compute_stats(StatsPeriod::Day).await.unwrap();

    assert_eq!(report.by_data_type[&DataType::Products], 5);
    assert_eq!(report.by_data_type[&DataType::Orders], 5);
    assert_eq!(report.total_records_processed, 5);
}
