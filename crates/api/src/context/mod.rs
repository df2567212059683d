//! Application context - dependency injection container

use std::sync::Arc;

use anyhow::Context as _;
use syncbridge_core::{
    AdapterFactory, ConnectionManager, ConnectionSettings, RecordSink, StatsAggregator,
    SyncEngine, SyncEngineSettings, SyncJobRepository, SystemRegistry, SystemRepository,
};
use syncbridge_domain::{Config, Result};
use syncbridge_infra::{
    AdapterCatalog, DiscardRecordSink, MemorySyncJobRepository, MemorySystemRepository,
};
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub factory: Arc<dyn AdapterFactory>,
    pub registry: Arc<SystemRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub engine: Arc<SyncEngine>,
    pub stats: Arc<StatsAggregator>,
}

impl AppContext {
    /// Load configuration (environment, `.env`, then config files) and wire
    /// the default in-memory stack.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = syncbridge_infra::config::load().context("failed to load configuration")?;
        Self::new(config).context("failed to initialize application context")
    }

    /// Built-in adapters writing into a discarding record sink.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_sink(config, Arc::new(DiscardRecordSink))
    }

    /// Built-in adapters writing fetched batches into `sink`.
    pub fn with_sink(config: Config, sink: Arc<dyn RecordSink>) -> Result<Self> {
        let catalog = AdapterCatalog::with_builtin(&config.http, sink)?;
        Self::with_factory(config, Arc::new(catalog))
    }

    /// Custom adapter factory over in-memory storage.
    pub fn with_factory(config: Config, factory: Arc<dyn AdapterFactory>) -> Result<Self> {
        Self::with_storage(
            config,
            factory,
            Arc::new(MemorySystemRepository::new()),
            Arc::new(MemorySyncJobRepository::new()),
        )
    }

    /// Full control over adapters and storage backends.
    pub fn with_storage(
        config: Config,
        factory: Arc<dyn AdapterFactory>,
        systems: Arc<dyn SystemRepository>,
        jobs: Arc<dyn SyncJobRepository>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(SystemRegistry::new(systems, Arc::clone(&factory)));
        let connections = Arc::new(ConnectionManager::new(
            Arc::clone(&registry),
            ConnectionSettings::from(&config.engine),
        ));
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&registry),
            Arc::clone(&jobs),
            SyncEngineSettings::from(&config),
        ));
        let stats = Arc::new(StatsAggregator::new(Arc::clone(&registry), jobs));

        info!(
            supported_types = ?factory.supported_types(),
            concurrency = %config.engine.concurrency,
            "application context initialized"
        );

        Ok(Self { config, factory, registry, connections, engine, stats })
    }

    /// Stop accepting syncs, cancel in-flight jobs and wait for them to
    /// settle, then disconnect every live system.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        self.engine.shutdown().await?;

        for system in self.registry.list_active().await? {
            match self.connections.disconnect(&system.id).await {
                Ok(true) => {}
                Ok(false) => warn!(system_id = %system.id, "adapter failed to disconnect during shutdown"),
                Err(err) => warn!(system_id = %system.id, error = %err, "disconnect during shutdown failed"),
            }
        }

        Ok(())
    }
}
