//! Sync management commands

use serde::Deserialize;
use syncbridge_domain::{
    Result, StatsPeriod, StatsReport, SyncBridgeError, SyncJob, SyncMode, SyncRequest,
};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::systems::parse_data_types;
use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Payload for submitting a sync job
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StartSyncRequest {
    pub system_id: String,
    /// `full` when absent.
    #[serde(default)]
    pub sync_mode: Option<String>,
    pub data_types: Vec<String>,
    /// Engine default when absent.
    #[serde(default)]
    pub batch_size: Option<u32>,
}

impl StartSyncRequest {
    fn into_sync_request(self) -> Result<SyncRequest> {
        let mode = match self.sync_mode.as_deref() {
            Some(mode) => mode.parse::<SyncMode>()?,
            None => SyncMode::Full,
        };
        let mut request =
            SyncRequest::new(self.system_id, parse_data_types(&self.data_types)?).with_mode(mode);
        if let Some(batch_size) = self.batch_size {
            request = request.with_batch_size(batch_size);
        }
        Ok(request)
    }
}

/// Submit a sync job and return its `running` handle immediately.
pub async fn start_sync(ctx: &AppContext, request: StartSyncRequest) -> CommandResult<SyncJob> {
    execute_command("sync::start_sync", || async move {
        let request = request.into_sync_request()?;
        ctx.engine.start_sync(request).await
    })
    .await
}

/// Current state of a job, running or settled.
pub async fn get_sync_status(ctx: &AppContext, job_id: &str) -> CommandResult<SyncJob> {
    execute_command("sync::get_sync_status", || async {
        ctx.engine
            .get_sync_status(job_id)
            .await?
            .ok_or_else(|| SyncBridgeError::NotFound(format!("sync job {job_id}")))
    })
    .await
}

pub async fn list_active_syncs(ctx: &AppContext) -> CommandResult<Vec<SyncJob>> {
    execute_command("sync::list_active_syncs", || ctx.engine.list_active_syncs()).await
}

/// Windowed statistics; `period` is `day`, `week` or `month`.
pub async fn get_sync_stats(ctx: &AppContext, period: &str) -> CommandResult<StatsReport> {
    execute_command("sync::get_sync_stats", || async {
        let period: StatsPeriod = period.parse()?;
        ctx.stats.compute_stats(period).await
    })
    .await
}
