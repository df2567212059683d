//! System management commands

use serde::Deserialize;
use syncbridge_domain::{
    ConnectionConfig, DataType, IntegratedSystem, NewSystem, Result, SyncBridgeError, SystemType,
};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::CommandResult;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Payload for registering a system
///
/// Enumerations arrive as strings so unknown values surface as `400`
/// rather than a transport-level decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AddSystemRequest {
    pub name: String,
    pub system_type: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "ts-gen", ts(type = "Record<string, unknown>"))]
    pub config: ConnectionConfig,
    /// Empty means "everything the adapter supports".
    #[serde(default)]
    pub features: Vec<String>,
}

impl AddSystemRequest {
    fn into_new_system(self) -> Result<NewSystem> {
        let system_type: SystemType = self.system_type.parse()?;
        let features = parse_data_types(&self.features)?;

        let mut draft = NewSystem::new(self.name, system_type)
            .with_config(self.config)
            .with_features(features);
        if let Some(version) = self.version {
            draft = draft.with_version(version);
        }
        Ok(draft)
    }
}

pub(crate) fn parse_data_types(values: &[String]) -> Result<Vec<DataType>> {
    values.iter().map(|value| value.parse::<DataType>()).collect()
}

/// Register a new system; it starts `inactive`.
pub async fn add_system(ctx: &AppContext, request: AddSystemRequest) -> CommandResult<IntegratedSystem> {
    execute_command("systems::add_system", || async move {
        let draft = request.into_new_system()?;
        ctx.registry.add_system(draft).await
    })
    .await
}

/// Remove a system, disconnecting it first. `false` for an unknown id.
pub async fn remove_system(ctx: &AppContext, system_id: &str) -> CommandResult<bool> {
    execute_command("systems::remove_system", || ctx.registry.remove_system(system_id)).await
}

pub async fn get_system(ctx: &AppContext, system_id: &str) -> CommandResult<IntegratedSystem> {
    execute_command("systems::get_system", || async {
        ctx.registry
            .get_system(system_id)
            .await?
            .ok_or_else(|| SyncBridgeError::SystemNotFound(system_id.to_string()))
    })
    .await
}

/// Every registered system in registration order.
pub async fn list_systems(ctx: &AppContext) -> CommandResult<Vec<IntegratedSystem>> {
    execute_command("systems::list_systems", || ctx.registry.list_all()).await
}

/// Systems that are `active` or `connecting`.
pub async fn list_active_systems(ctx: &AppContext) -> CommandResult<Vec<IntegratedSystem>> {
    execute_command("systems::list_active_systems", || ctx.registry.list_active()).await
}

/// System types with an adapter in the catalog.
pub fn supported_system_types(ctx: &AppContext) -> Vec<SystemType> {
    ctx.factory.supported_types()
}
