//! Scriptable adapter and factory mocks

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use syncbridge_core::{AdapterFactory, SystemAdapter};
use syncbridge_domain::{
    ConnectionConfig, ConnectionTestReport, DataType, Result, SyncBridgeError, SyncOptions,
    SyncOutcome, SystemType,
};
use tokio::sync::Semaphore;

/// What the next `sync` call does
#[derive(Debug, Clone)]
pub enum SyncScript {
    Outcome(SyncOutcome),
    Fail(String),
    Panic(String),
    /// Never settles on its own.
    Hang,
}

impl SyncScript {
    pub fn processed(records: u64) -> Self {
        Self::Outcome(SyncOutcome { records_processed: records, ..SyncOutcome::default() })
    }
}

/// What `connect` does
#[derive(Debug, Clone)]
pub enum ConnectScript {
    Accept,
    Refuse,
    Fail(String),
    Hang,
}

/// In-memory adapter whose every operation can be scripted
pub struct MockAdapter {
    system_type: SystemType,
    capabilities: Vec<DataType>,
    connected: AtomicBool,
    connect_script: Mutex<ConnectScript>,
    fail_disconnect: AtomicBool,
    disconnect_calls: AtomicUsize,
    test_error: Mutex<Option<String>>,
    hang_test: AtomicBool,
    sync_default: Mutex<SyncScript>,
    sync_queue: Mutex<VecDeque<SyncScript>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    sync_calls: Mutex<Vec<SyncOptions>>,
    connect_configs: Mutex<Vec<ConnectionConfig>>,
}

impl MockAdapter {
    pub fn new(system_type: SystemType, capabilities: Vec<DataType>) -> Self {
        Self {
            system_type,
            capabilities,
            connected: AtomicBool::new(false),
            connect_script: Mutex::new(ConnectScript::Accept),
            fail_disconnect: AtomicBool::new(false),
            disconnect_calls: AtomicUsize::new(0),
            test_error: Mutex::new(None),
            hang_test: AtomicBool::new(false),
            sync_default: Mutex::new(SyncScript::Outcome(SyncOutcome::default())),
            sync_queue: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            sync_calls: Mutex::new(Vec::new()),
            connect_configs: Mutex::new(Vec::new()),
        }
    }

    pub fn script_connect(&self, script: ConnectScript) {
        *self.connect_script.lock() = script;
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_test_connection(&self, message: &str) {
        *self.test_error.lock() = Some(message.to_string());
    }

    /// Make every connectivity probe wait forever.
    pub fn hang_test_connection(&self) {
        self.hang_test.store(true, Ordering::SeqCst);
    }

    /// Behaviour for every sync call without a queued script.
    pub fn script_sync(&self, script: SyncScript) {
        *self.sync_default.lock() = script;
    }

    /// Behaviour for the next sync call only.
    pub fn push_sync(&self, script: SyncScript) {
        self.sync_queue.lock().push_back(script);
    }

    /// Hold every subsequent sync until a permit is added to the returned gate.
    pub fn hold_syncs(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn sync_calls(&self) -> Vec<SyncOptions> {
        self.sync_calls.lock().clone()
    }

    pub fn connect_configs(&self) -> Vec<ConnectionConfig> {
        self.connect_configs.lock().clone()
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn next_sync_script(&self) -> SyncScript {
        self.sync_queue.lock().pop_front().unwrap_or_else(|| self.sync_default.lock().clone())
    }
}

#[async_trait]
impl SystemAdapter for MockAdapter {
    fn system_type(&self) -> SystemType {
        self.system_type
    }

    fn capabilities(&self) -> &[DataType] {
        &self.capabilities
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<bool> {
        self.connect_configs.lock().push(config.clone());
        let script = self.connect_script.lock().clone();
        match script {
            ConnectScript::Accept => {
                self.connected.store(true, Ordering::SeqCst);
                Ok(true)
            }
            ConnectScript::Refuse => Ok(false),
            ConnectScript::Fail(message) => Err(SyncBridgeError::Config(message)),
            ConnectScript::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(false)
            }
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(SyncBridgeError::Network("socket already closed".into()));
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn test_connection(&self) -> Result<ConnectionTestReport> {
        if self.hang_test.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failure = self.test_error.lock().clone();
        if let Some(message) = failure {
            return Err(SyncBridgeError::Network(message));
        }
        Ok(ConnectionTestReport::ok("pong", 3))
    }

    async fn sync(&self, options: &SyncOptions) -> Result<SyncOutcome> {
        self.sync_calls.lock().push(options.clone());
        let script = self.next_sync_script();

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match script {
            SyncScript::Outcome(outcome) => Ok(outcome),
            SyncScript::Fail(message) => Err(SyncBridgeError::Network(message)),
            SyncScript::Panic(message) => panic!("{message}"),
            SyncScript::Hang => {
                std::future::pending::<()>().await;
                Ok(SyncOutcome::default())
            }
        }
    }
}

/// Factory supporting Shopify and Odoo, remembering every adapter it builds
#[derive(Default)]
pub struct MockAdapterFactory {
    created: Mutex<Vec<Arc<MockAdapter>>>,
}

impl MockAdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_created(&self) -> Option<Arc<MockAdapter>> {
        self.created.lock().last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl AdapterFactory for MockAdapterFactory {
    fn create(
        &self,
        system_type: SystemType,
        _config: &ConnectionConfig,
    ) -> Result<Arc<dyn SystemAdapter>> {
        let capabilities = match system_type {
            SystemType::Shopify => DataType::ALL.to_vec(),
            SystemType::Odoo => vec![DataType::Products, DataType::Orders, DataType::Customers],
            other => return Err(SyncBridgeError::UnsupportedSystemType(other.to_string())),
        };

        let adapter = Arc::new(MockAdapter::new(system_type, capabilities));
        self.created.lock().push(adapter.clone());
        Ok(adapter)
    }

    fn supported_types(&self) -> Vec<SystemType> {
        vec![SystemType::Shopify, SystemType::Odoo]
    }
}
