//! Process-memory system records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use syncbridge_core::SystemRepository;
use syncbridge_domain::{
    ConnectionConfig, IntegratedSystem, Result, SyncBridgeError, SystemStatus,
};

/// `SystemRepository` backed by a vector in registration order
#[derive(Default)]
pub struct MemorySystemRepository {
    systems: RwLock<Vec<IntegratedSystem>>,
}

impl MemorySystemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.systems.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.read().is_empty()
    }

    fn modify<T>(&self, id: &str, apply: impl FnOnce(&mut IntegratedSystem) -> T) -> Result<T> {
        let mut systems = self.systems.write();
        let system = systems
            .iter_mut()
            .find(|system| system.id == id)
            .ok_or_else(|| SyncBridgeError::SystemNotFound(id.to_string()))?;
        Ok(apply(system))
    }
}

#[async_trait]
impl SystemRepository for MemorySystemRepository {
    async fn insert(&self, system: IntegratedSystem) -> Result<()> {
        let mut systems = self.systems.write();
        if systems.iter().any(|existing| existing.id == system.id) {
            return Err(SyncBridgeError::Conflict(format!(
                "system id {} is already registered",
                system.id
            )));
        }
        systems.push(system);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<IntegratedSystem>> {
        Ok(self.systems.read().iter().find(|system| system.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<IntegratedSystem>> {
        Ok(self.systems.read().clone())
    }

    async fn remove(&self, id: &str) -> Result<Option<IntegratedSystem>> {
        let mut systems = self.systems.write();
        Ok(systems.iter().position(|system| system.id == id).map(|index| systems.remove(index)))
    }

    async fn set_status(&self, id: &str, status: SystemStatus) -> Result<()> {
        self.modify(id, |system| system.status = status)
    }

    async fn transition_status(
        &self,
        id: &str,
        allowed_from: &[SystemStatus],
        to: SystemStatus,
    ) -> Result<Option<SystemStatus>> {
        self.modify(id, |system| {
            if !allowed_from.contains(&system.status) {
                return None;
            }
            let previous = system.status;
            system.status = to;
            Some(previous)
        })
    }

    async fn set_config(&self, id: &str, config: ConnectionConfig) -> Result<()> {
        self.modify(id, |system| system.config = config)
    }

    async fn set_last_sync(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.modify(id, |system| {
            // Parallel jobs may settle out of order.
            if system.last_sync_at.map_or(true, |current| at > current) {
                system.last_sync_at = Some(at);
            }
        })
    }

    async fn set_sync_watermark(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.modify(id, |system| {
            if system.sync_watermark.map_or(true, |current| at > current) {
                system.sync_watermark = Some(at);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use syncbridge_domain::SystemType;

    use super::*;

    fn system(id: &str) -> IntegratedSystem {
        IntegratedSystem {
            id: id.to_string(),
            name: format!("{id} store"),
            system_type: SystemType::Shopify,
            version: "2024-01".to_string(),
            status: SystemStatus::Inactive,
            config: ConnectionConfig::new(),
            features: vec![],
            last_sync_at: None,
            sync_watermark: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn keeps_registration_order_and_rejects_duplicates() {
        let repo = MemorySystemRepository::new();
        repo.insert(system("b")).await.unwrap();
        repo.insert(system("a")).await.unwrap();

        let err = repo.insert(system("a")).await.unwrap_err();

        assert!(matches!(err, SyncBridgeError::Conflict(_)));
        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn transition_only_applies_from_allowed_states() {
        let repo = MemorySystemRepository::new();
        repo.insert(system("a")).await.unwrap();

        let applied = repo
            .transition_status("a", &[SystemStatus::Inactive], SystemStatus::Connecting)
            .await
            .unwrap();
        let rejected = repo
            .transition_status("a", &[SystemStatus::Inactive], SystemStatus::Connecting)
            .await
            .unwrap();

        assert_eq!(applied, Some(SystemStatus::Inactive));
        assert_eq!(rejected, None);
        assert_eq!(repo.get("a").await.unwrap().unwrap().status, SystemStatus::Connecting);
    }

    #[tokio::test]
    async fn last_sync_never_moves_backwards() {
        let repo = MemorySystemRepository::new();
        repo.insert(system("a")).await.unwrap();
        let later = Utc::now();

        repo.set_last_sync("a", later).await.unwrap();
        repo.set_last_sync("a", later - Duration::minutes(5)).await.unwrap();

        assert_eq!(repo.get("a").await.unwrap().unwrap().last_sync_at, Some(later));
    }

    #[tokio::test]
    async fn watermark_moves_independently_of_last_sync() {
        let repo = MemorySystemRepository::new();
        repo.insert(system("a")).await.unwrap();
        let started = Utc::now() - Duration::minutes(2);

        repo.set_sync_watermark("a", started).await.unwrap();
        repo.set_sync_watermark("a", started - Duration::minutes(10)).await.unwrap();
        repo.set_last_sync("a", Utc::now()).await.unwrap();

        let stored = repo.get("a").await.unwrap().unwrap();
        assert_eq!(stored.sync_watermark, Some(started));
        assert!(stored.last_sync_at > stored.sync_watermark);
    }

    #[tokio::test]
    async fn updates_on_unknown_id_are_not_found() {
        let repo = MemorySystemRepository::new();

        let err = repo.set_status("ghost", SystemStatus::Active).await.unwrap_err();

        assert_eq!(err, SyncBridgeError::SystemNotFound("ghost".into()));
        assert!(repo.remove("ghost").await.unwrap().is_none());
    }
}
