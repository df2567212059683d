//! Shared test helpers for `syncbridge-core` integration tests.
//!
//! Scriptable adapters plus in-memory repositories, wired together by
//! [`Harness`] so engine tests can focus on behaviour instead of plumbing.

#![allow(dead_code)]

pub mod adapters;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use syncbridge_core::{
    ConnectionManager, ConnectionSettings, StatsAggregator, SyncEngine, SyncEngineSettings,
    SystemRegistry,
};
use syncbridge_domain::{DataType, IntegratedSystem, NewSystem, SystemType};

pub use adapters::{MockAdapter, MockAdapterFactory, SyncScript};
pub use repositories::{MockSyncJobRepository, MockSystemRepository};

/// Generous upper bound for waiting on detached settlement in tests.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Fully wired core services over mocks
pub struct Harness {
    pub factory: Arc<MockAdapterFactory>,
    pub systems: Arc<MockSystemRepository>,
    pub jobs: Arc<MockSyncJobRepository>,
    pub registry: Arc<SystemRegistry>,
    pub connections: ConnectionManager,
    pub engine: SyncEngine,
    pub stats: StatsAggregator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(SyncEngineSettings::default(), fast_connection_settings())
    }

    pub fn with_engine_settings(settings: SyncEngineSettings) -> Self {
        Self::with_settings(settings, fast_connection_settings())
    }

    pub fn with_settings(engine: SyncEngineSettings, connection: ConnectionSettings) -> Self {
        let factory = Arc::new(MockAdapterFactory::new());
        let systems = Arc::new(MockSystemRepository::default());
        let jobs = Arc::new(MockSyncJobRepository::default());
        let registry = Arc::new(SystemRegistry::new(systems.clone(), factory.clone()));

        Self {
            connections: ConnectionManager::new(registry.clone(), connection),
            engine: SyncEngine::new(registry.clone(), jobs.clone(), engine),
            stats: StatsAggregator::new(registry.clone(), jobs.clone()),
            factory,
            systems,
            jobs,
            registry,
        }
    }

    /// Register a Shopify-typed system declaring `features`.
    pub async fn register(&self, features: &[DataType]) -> (IntegratedSystem, Arc<MockAdapter>) {
        let system = self
            .registry
            .add_system(
                NewSystem::new("Test Store", SystemType::Shopify)
                    .with_version("2024-01")
                    .with_features(features.to_vec()),
            )
            .await
            .expect("registration should succeed");
        let adapter = self.factory.last_created().expect("adapter should be recorded");
        (system, adapter)
    }

    /// Register and connect a system.
    pub async fn connected(&self, features: &[DataType]) -> (IntegratedSystem, Arc<MockAdapter>) {
        let (system, adapter) = self.register(features).await;
        let connected =
            self.connections.connect(&system.id, None).await.expect("connect should not error");
        assert!(connected, "mock adapter should accept the connection");
        let system = self.registry.get_system(&system.id).await.unwrap().unwrap();
        (system, adapter)
    }
}

pub fn fast_connection_settings() -> ConnectionSettings {
    ConnectionSettings {
        connect_timeout: Duration::from_millis(200),
        test_timeout: Duration::from_millis(200),
    }
}

/// Initialise a test subscriber once; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}
