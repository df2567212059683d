//! Lookup-table adapter factory

use std::collections::BTreeMap;
use std::sync::Arc;

use syncbridge_core::{AdapterFactory, RecordSink, SystemAdapter};
use syncbridge_domain::{ConnectionConfig, HttpConfig, Result, SyncBridgeError, SystemType};
use tracing::debug;

use super::{OdooAdapter, ShopifyAdapter};
use crate::http::HttpClient;

type Constructor = Box<dyn Fn(&ConnectionConfig) -> Result<Arc<dyn SystemAdapter>> + Send + Sync>;

/// Maps each system type to the constructor of its adapter
///
/// Types without an entry are rejected with `UnsupportedSystemType`.
#[derive(Default)]
pub struct AdapterCatalog {
    constructors: BTreeMap<SystemType, Constructor>,
}

impl AdapterCatalog {
    /// Empty catalog; every type is unsupported until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the Shopify and Odoo adapters sharing one HTTP client.
    pub fn with_builtin(http: &HttpConfig, sink: Arc<dyn RecordSink>) -> Result<Self> {
        let client = HttpClient::from_config(http)?;
        let mut catalog = Self::new();

        {
            let client = client.clone();
            let sink = Arc::clone(&sink);
            catalog.register(SystemType::Shopify, move |config| {
                let adapter: Arc<dyn SystemAdapter> =
                    Arc::new(ShopifyAdapter::new(client.clone(), Arc::clone(&sink), config.clone()));
                Ok(adapter)
            });
        }
        catalog.register(SystemType::Odoo, move |config| {
            let adapter: Arc<dyn SystemAdapter> =
                Arc::new(OdooAdapter::new(client.clone(), Arc::clone(&sink), config.clone()));
            Ok(adapter)
        });

        Ok(catalog)
    }

    /// Add or replace the constructor for `system_type`.
    pub fn register<F>(&mut self, system_type: SystemType, constructor: F) -> &mut Self
    where
        F: Fn(&ConnectionConfig) -> Result<Arc<dyn SystemAdapter>> + Send + Sync + 'static,
    {
        if self.constructors.insert(system_type, Box::new(constructor)).is_some() {
            debug!(%system_type, "replaced adapter constructor");
        }
        self
    }

    pub fn supports(&self, system_type: SystemType) -> bool {
        self.constructors.contains_key(&system_type)
    }
}

impl AdapterFactory for AdapterCatalog {
    fn create(
        &self,
        system_type: SystemType,
        config: &ConnectionConfig,
    ) -> Result<Arc<dyn SystemAdapter>> {
        let constructor = self
            .constructors
            .get(&system_type)
            .ok_or_else(|| SyncBridgeError::UnsupportedSystemType(system_type.to_string()))?;
        constructor(config)
    }

    fn supported_types(&self) -> Vec<SystemType> {
        self.constructors.keys().copied().collect()
    }
}
