//! Odoo adapter: `common.login` sessions and `search_read` paging

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use syncbridge_core::{RecordSink, SystemAdapter};
use syncbridge_domain::{
    ConnectionConfig, ConnectionTestReport, DataType, Result, SyncBridgeError, SyncOptions,
    SyncOutcome, SystemType,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::rpc::RpcClient;
use crate::http::HttpClient;
use crate::integrations::{deliver_batch, is_connectivity_failure};

const RPC_PATH: &str = "jsonrpc";
/// Odoo stores `write_date` as naive UTC in this format.
const ODOO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CAPABILITIES: [DataType; 4] =
    [DataType::Products, DataType::Orders, DataType::Customers, DataType::Inventory];

/// Model, fields and base domain read for one data type
struct ModelQuery {
    model: &'static str,
    fields: &'static [&'static str],
    domain: fn() -> Vec<Value>,
}

impl ModelQuery {
    fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Products => Self {
                model: "product.product",
                fields: &["id", "name", "default_code", "list_price", "qty_available", "write_date"],
                domain: Vec::new,
            },
            DataType::Orders => Self {
                model: "sale.order",
                fields: &["id", "name", "partner_id", "amount_total", "state", "date_order", "write_date"],
                domain: Vec::new,
            },
            DataType::Customers => Self {
                model: "res.partner",
                fields: &["id", "name", "email", "phone", "write_date"],
                domain: || vec![json!(["customer_rank", ">", 0])],
            },
            DataType::Inventory => Self {
                model: "stock.quant",
                fields: &["id", "product_id", "location_id", "quantity", "write_date"],
                domain: || vec![json!(["location_id.usage", "=", "internal"])],
            },
        }
    }
}

/// Credentials and endpoint from the connection config
#[derive(Clone)]
struct OdooCredentials {
    endpoint: Url,
    database: String,
    username: String,
    api_key: String,
}

impl OdooCredentials {
    fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let url = config.require_str("url")?;
        let database = config.require_str("database")?;
        let username = config.require_str("username")?;
        let api_key = config.require_str("api_key")?;

        let base = Url::parse(&format!("{}/", url.trim_end_matches('/')))
            .map_err(|err| SyncBridgeError::Config(format!("invalid url '{url}': {err}")))?;
        let endpoint = base
            .join(RPC_PATH)
            .map_err(|err| SyncBridgeError::Config(format!("invalid url '{url}': {err}")))?;

        Ok(Self {
            endpoint,
            database: database.to_string(),
            username: username.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Clone)]
struct OdooSession {
    credentials: OdooCredentials,
    uid: i64,
}

#[derive(Debug, Deserialize)]
struct ServerVersion {
    server_version: String,
}

/// Adapter for Odoo databases via the external JSON-RPC API
///
/// Config keys (all required): `url`, `database`, `username`, `api_key`.
pub struct OdooAdapter {
    rpc: RpcClient,
    sink: Arc<dyn RecordSink>,
    config: RwLock<ConnectionConfig>,
    session: RwLock<Option<OdooSession>>,
}

impl OdooAdapter {
    pub fn new(http: HttpClient, sink: Arc<dyn RecordSink>, config: ConnectionConfig) -> Self {
        Self {
            rpc: RpcClient::new(http),
            sink,
            config: RwLock::new(config),
            session: RwLock::new(None),
        }
    }

    fn current_session(&self) -> Option<OdooSession> {
        self.session.read().clone()
    }

    /// `Some(uid)` on success, `None` when Odoo refuses the credentials.
    async fn login(&self, credentials: &OdooCredentials) -> Result<Option<i64>> {
        let result: Value = self
            .rpc
            .call(
                &credentials.endpoint,
                "common",
                "login",
                json!([credentials.database, credentials.username, credentials.api_key]),
            )
            .await?;
        Ok(result.as_i64())
    }

    async fn server_version(&self, endpoint: &Url) -> Result<String> {
        let version: ServerVersion = self.rpc.call(endpoint, "common", "version", json!([])).await?;
        Ok(version.server_version)
    }

    async fn search_read(
        &self,
        session: &OdooSession,
        query: &ModelQuery,
        domain: &[Value],
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Value>> {
        let credentials = &session.credentials;
        self.rpc
            .call(
                &credentials.endpoint,
                "object",
                "execute_kw",
                json!([
                    credentials.database,
                    session.uid,
                    credentials.api_key,
                    query.model,
                    "search_read",
                    [domain],
                    {"fields": query.fields, "limit": limit, "offset": offset, "order": "id asc"},
                ]),
            )
            .await
    }

    async fn pull(
        &self,
        session: &OdooSession,
        options: &SyncOptions,
        data_type: DataType,
        outcome: &mut SyncOutcome,
    ) -> Result<()> {
        let query = ModelQuery::for_data_type(data_type);
        let mut domain = (query.domain)();
        if let Some(since) = options.since {
            domain.push(json!(["write_date", ">", since.format(ODOO_DATETIME_FORMAT).to_string()]));
        }

        let limit = options.batch_size.max(1);
        let mut offset = 0u64;
        loop {
            let page = self.search_read(session, &query, &domain, limit, offset).await?;
            if !page.is_empty() {
                deliver_batch(self.sink.as_ref(), &options.system_id, data_type, &page, outcome).await;
            }
            if page.len() < limit as usize {
                break;
            }
            offset += page.len() as u64;
        }

        debug!(system_id = %options.system_id, model = query.model, read = offset, "finished Odoo pull");
        Ok(())
    }
}

#[async_trait]
impl SystemAdapter for OdooAdapter {
    fn system_type(&self) -> SystemType {
        SystemType::Odoo
    }

    fn capabilities(&self) -> &[DataType] {
        &CAPABILITIES
    }

    #[instrument(skip_all)]
    async fn connect(&self, config: &ConnectionConfig) -> Result<bool> {
        let credentials = OdooCredentials::from_config(config)?;

        match self.login(&credentials).await {
            Ok(Some(uid)) => {
                info!(database = %credentials.database, uid, "logged into Odoo");
                *self.config.write() = config.clone();
                *self.session.write() = Some(OdooSession { credentials, uid });
                Ok(true)
            }
            Ok(None) => {
                warn!(database = %credentials.database, "Odoo refused the credentials");
                *self.session.write() = None;
                Ok(false)
            }
            Err(err) if is_connectivity_failure(&err) => {
                warn!(error = %err, "Odoo login failed");
                *self.session.write() = None;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        // API-key sessions are stateless on the server side.
        self.session.write().take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    async fn test_connection(&self) -> Result<ConnectionTestReport> {
        let endpoint = match self.current_session() {
            Some(session) => session.credentials.endpoint,
            None => {
                let config = self.config.read().clone();
                match OdooCredentials::from_config(&config) {
                    Ok(credentials) => credentials.endpoint,
                    Err(err) => return Ok(ConnectionTestReport::failed(err.to_string(), 0)),
                }
            }
        };

        let started = Instant::now();
        let result = self.server_version(&endpoint).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(match result {
            Ok(version) => ConnectionTestReport::ok(format!("Odoo {version}"), elapsed_ms),
            Err(err) => ConnectionTestReport::failed(err.to_string(), elapsed_ms),
        })
    }

    #[instrument(skip_all, fields(system_id = %options.system_id, mode = %options.sync_mode))]
    async fn sync(&self, options: &SyncOptions) -> Result<SyncOutcome> {
        let session = self
            .current_session()
            .ok_or_else(|| SyncBridgeError::SystemNotConnected(options.system_id.clone()))?;

        let mut outcome = SyncOutcome::default();
        for &data_type in &options.data_types {
            match self.pull(&session, options, data_type, &mut outcome).await {
                Ok(()) => {}
                Err(err @ SyncBridgeError::Auth(_)) => return Err(err),
                Err(err) => {
                    warn!(%data_type, error = %err, "Odoo pull failed");
                    outcome.record_error(format!("{data_type}: {err}"));
                }
            }
        }
        Ok(outcome)
    }
}
