//! System registry - configured integrations and their bound adapters

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use syncbridge_domain::{
    dedup_data_types, ConnectionConfig, IntegratedSystem, NewSystem, Result, SyncBridgeError,
    SystemStatus,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{AdapterFactory, SystemAdapter, SystemRepository};

/// A system record together with its live adapter handle
#[derive(Clone)]
pub struct BoundSystem {
    pub system: IntegratedSystem,
    pub adapter: Arc<dyn SystemAdapter>,
}

/// Registry of integrated systems
///
/// Records are persisted through [`SystemRepository`]; adapter instances are
/// process-local session handles kept alongside, created at registration and
/// dropped at removal.
pub struct SystemRegistry {
    repository: Arc<dyn SystemRepository>,
    factory: Arc<dyn AdapterFactory>,
    adapters: DashMap<String, Arc<dyn SystemAdapter>>,
}

impl SystemRegistry {
    pub fn new(repository: Arc<dyn SystemRepository>, factory: Arc<dyn AdapterFactory>) -> Self {
        Self { repository, factory, adapters: DashMap::new() }
    }

    /// Register a new system and instantiate its adapter
    ///
    /// # Errors
    ///
    /// - `UnsupportedSystemType` if no adapter exists for the type
    /// - `InvalidInput` for a blank name or features the adapter cannot sync
    #[instrument(skip(self, draft), fields(system_type = %draft.system_type, name = %draft.name))]
    pub async fn add_system(&self, draft: NewSystem) -> Result<IntegratedSystem> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(SyncBridgeError::InvalidInput("system name must not be empty".into()));
        }

        let adapter = self.factory.create(draft.system_type, &draft.config)?;
        let capabilities = adapter.capabilities();

        let features = if draft.features.is_empty() {
            capabilities.to_vec()
        } else {
            dedup_data_types(&draft.features)
        };
        if let Some(unsupported) = features.iter().find(|f| !capabilities.contains(*f)) {
            return Err(SyncBridgeError::InvalidInput(format!(
                "{} adapter cannot synchronize '{}'",
                draft.system_type, unsupported
            )));
        }

        let system = IntegratedSystem {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            system_type: draft.system_type,
            version: draft.version,
            status: SystemStatus::Inactive,
            config: draft.config,
            features,
            last_sync_at: None,
            sync_watermark: None,
            created_at: Utc::now(),
        };

        self.repository.insert(system.clone()).await?;
        self.adapters.insert(system.id.clone(), adapter);

        info!(system_id = %system.id, "Registered integrated system");
        Ok(system)
    }

    /// Remove a system, force-disconnecting its adapter first
    ///
    /// Returns `false` if the id is unknown. A failing disconnect is logged
    /// and does not block removal.
    #[instrument(skip(self))]
    pub async fn remove_system(&self, id: &str) -> Result<bool> {
        if self.repository.get(id).await?.is_none() {
            return Ok(false);
        }

        if let Some(adapter) = self.adapter(id) {
            if adapter.is_connected() {
                if let Err(err) = adapter.disconnect().await {
                    warn!(system_id = id, error = %err, "Disconnect failed during removal");
                }
            }
        }

        let removed = self.repository.remove(id).await?.is_some();
        self.adapters.remove(id);

        if removed {
            info!(system_id = id, "Removed integrated system");
        }
        Ok(removed)
    }

    pub async fn get_system(&self, id: &str) -> Result<Option<IntegratedSystem>> {
        self.repository.get(id).await
    }

    /// Systems that are active or connecting.
    pub async fn list_active(&self) -> Result<Vec<IntegratedSystem>> {
        let systems = self.repository.list().await?;
        Ok(systems.into_iter().filter(|s| s.status.is_live()).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<IntegratedSystem>> {
        self.repository.list().await
    }

    /// Record plus adapter, or `SystemNotFound` if either has gone away.
    pub async fn bound(&self, id: &str) -> Result<BoundSystem> {
        let system = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| SyncBridgeError::SystemNotFound(id.to_string()))?;
        let adapter =
            self.adapter(id).ok_or_else(|| SyncBridgeError::SystemNotFound(id.to_string()))?;
        Ok(BoundSystem { system, adapter })
    }

    pub(crate) async fn set_status(&self, id: &str, status: SystemStatus) -> Result<()> {
        self.repository.set_status(id, status).await
    }

    pub(crate) async fn transition_status(
        &self,
        id: &str,
        allowed_from: &[SystemStatus],
        to: SystemStatus,
    ) -> Result<Option<SystemStatus>> {
        self.repository.transition_status(id, allowed_from, to).await
    }

    pub(crate) async fn persist_config(&self, id: &str, config: ConnectionConfig) -> Result<()> {
        self.repository.set_config(id, config).await
    }

    /// Stamp a settlement; `watermark` is the start of a completed job.
    pub(crate) async fn record_sync(
        &self,
        id: &str,
        ended_at: DateTime<Utc>,
        watermark: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.repository.set_last_sync(id, ended_at).await?;
        if let Some(started_at) = watermark {
            self.repository.set_sync_watermark(id, started_at).await?;
        }
        Ok(())
    }

    fn adapter(&self, id: &str) -> Option<Arc<dyn SystemAdapter>> {
        self.adapters.get(id).map(|entry| Arc::clone(entry.value()))
    }
}
