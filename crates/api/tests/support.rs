//! Shared fixtures for command-layer tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use syncbridge_app::{AddSystemRequest, AppContext};
use syncbridge_core::{AdapterFactory, SystemAdapter};
use syncbridge_domain::{
    Config, ConnectionConfig, ConnectionTestReport, DataType, IntegratedSystem, Result,
    SyncBridgeError, SyncOptions, SyncOutcome, SystemType,
};

pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
/// Records the stub reports per requested data type.
pub const RECORDS_PER_TYPE: u64 = 4;
/// Access token the stub refuses.
pub const DENIED_TOKEN: &str = "deny";

/// Adapter that connects instantly and reports fixed record counts
#[derive(Default)]
pub struct StubAdapter {
    connected: AtomicBool,
}

#[async_trait]
impl SystemAdapter for StubAdapter {
    fn system_type(&self) -> SystemType {
        SystemType::Shopify
    }

    fn capabilities(&self) -> &[DataType] {
        &[DataType::Products, DataType::Orders]
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<bool> {
        let accepted = config.get_str("access_token") != Some(DENIED_TOKEN);
        self.connected.store(accepted, Ordering::SeqCst);
        Ok(accepted)
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn test_connection(&self) -> Result<ConnectionTestReport> {
        Ok(ConnectionTestReport::ok("pong", 1))
    }

    async fn sync(&self, options: &SyncOptions) -> Result<SyncOutcome> {
        Ok(SyncOutcome {
            records_processed: RECORDS_PER_TYPE * options.data_types.len() as u64,
            ..SyncOutcome::default()
        })
    }
}

/// Factory that only knows Shopify, backed by [`StubAdapter`]
pub struct StubFactory;

impl AdapterFactory for StubFactory {
    fn create(
        &self,
        system_type: SystemType,
        _config: &ConnectionConfig,
    ) -> Result<Arc<dyn SystemAdapter>> {
        match system_type {
            SystemType::Shopify => Ok(Arc::new(StubAdapter::default())),
            other => Err(SyncBridgeError::UnsupportedSystemType(other.to_string())),
        }
    }

    fn supported_types(&self) -> Vec<SystemType> {
        vec![SystemType::Shopify]
    }
}

pub fn context() -> AppContext {
    AppContext::with_factory(Config::default(), Arc::new(StubFactory)).expect("context")
}

pub fn shopify_request(name: &str) -> AddSystemRequest {
    AddSystemRequest {
        name: name.to_string(),
        system_type: "shopify".to_string(),
        version: Some("2024-07".to_string()),
        config: ConnectionConfig::new().with("access_token", "shpat_ok"),
        features: vec!["products".to_string(), "orders".to_string()],
    }
}

/// Register and connect a stub Shopify system.
pub async fn connected_system(ctx: &AppContext) -> IntegratedSystem {
    let system = syncbridge_app::add_system(ctx, shopify_request("Stub Store")).await.expect("add");
    assert!(syncbridge_app::connect_system(ctx, &system.id, None).await.expect("connect"));
    system
}
