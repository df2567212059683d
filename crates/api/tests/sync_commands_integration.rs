//! Integration tests for sync commands
//!
//! **Coverage:**
//! - Submission, settlement and status lookup through the command layer
//! - Fail-fast statuses (409 not connected, 400 bad payload, 404 unknown job)
//! - Stats period parsing and totals

mod support;

use support::{connected_system, context, shopify_request, RECORDS_PER_TYPE, SETTLE_TIMEOUT};
use syncbridge_app::{
    add_system, get_sync_stats, get_sync_status, list_active_syncs, start_sync, StartSyncRequest,
};
use syncbridge_domain::{SyncJobStatus, SyncMode};

fn request(system_id: &str, data_types: &[&str]) -> StartSyncRequest {
    StartSyncRequest {
        system_id: system_id.to_string(),
        sync_mode: None,
        data_types: data_types.iter().map(|s| s.to_string()).collect(),
        batch_size: Some(50),
    }
}

#[tokio::test]
async fn start_sync_settles_and_shows_up_in_stats() {
    let ctx = context();
    let system = connected_system(&ctx).await;

    let job = start_sync(&ctx, request(&system.id, &["products", "orders"])).await.unwrap();
    assert_eq!(job.status, SyncJobStatus::Running);
    assert_eq!(job.batch_size, 50);
    ctx.engine.wait_for_settlement(&job.id, SETTLE_TIMEOUT).await.unwrap();

    let settled = get_sync_status(&ctx, &job.id).await.unwrap();
    assert_eq!(settled.status, SyncJobStatus::Completed);
    assert_eq!(settled.records_processed, RECORDS_PER_TYPE * 2);
    assert!(list_active_syncs(&ctx).await.unwrap().is_empty());

    let stats = get_sync_stats(&ctx, "day").await.unwrap();
    assert_eq!(stats.total_syncs, 1);
    assert_eq!(stats.successful_syncs, 1);
    assert!((stats.success_rate - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn sync_mode_and_default_batch_size_are_applied() {
    let ctx = context();
    let system = connected_system(&ctx).await;

    let job = start_sync(
        &ctx,
        StartSyncRequest {
            sync_mode: Some("incremental".into()),
            batch_size: None,
            ..request(&system.id, &["products"])
        },
    )
    .await
    .unwrap();

    assert_eq!(job.sync_mode, SyncMode::Incremental);
    assert_eq!(job.batch_size, ctx.config.engine.default_batch_size);
    ctx.engine.wait_for_settlement(&job.id, SETTLE_TIMEOUT).await.unwrap();
}

#[tokio::test]
async fn unconnected_system_is_a_conflict() {
    let ctx = context();
    let system = add_system(&ctx, shopify_request("Idle Store")).await.unwrap();

    let err = start_sync(&ctx, request(&system.id, &["products"])).await.unwrap_err();

    assert_eq!(err.status, 409);
    assert_eq!(err.kind, "system_not_connected");
    assert!(list_active_syncs(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let ctx = context();
    let system = connected_system(&ctx).await;

    let bad_mode = start_sync(
        &ctx,
        StartSyncRequest { sync_mode: Some("eventually".into()), ..request(&system.id, &["products"]) },
    )
    .await
    .unwrap_err();
    let bad_type = start_sync(&ctx, request(&system.id, &["invoices"])).await.unwrap_err();
    let no_types = start_sync(&ctx, request(&system.id, &[])).await.unwrap_err();
    let undeclared = start_sync(&ctx, request(&system.id, &["inventory"])).await.unwrap_err();
    let oversized = start_sync(
        &ctx,
        StartSyncRequest { batch_size: Some(1_000_000), ..request(&system.id, &["products"]) },
    )
    .await
    .unwrap_err();

    for err in [bad_mode, bad_type, no_types, undeclared, oversized] {
        assert_eq!(err.status, 400, "{err}");
    }
}

#[tokio::test]
async fn unknown_job_and_system_are_not_found() {
    let ctx = context();

    assert_eq!(get_sync_status(&ctx, "no-such-job").await.unwrap_err().status, 404);
    assert_eq!(start_sync(&ctx, request("ghost", &["products"])).await.unwrap_err().status, 404);
}

#[tokio::test]
async fn stats_period_must_be_known() {
    let ctx = context();

    let err = get_sync_stats(&ctx, "fortnight").await.unwrap_err();
    let empty = get_sync_stats(&ctx, "MONTH").await.unwrap();

    assert_eq!(err.status, 400);
    assert_eq!(empty.total_syncs, 0);
    assert_eq!(empty.average_duration_secs, 0.0);
}
