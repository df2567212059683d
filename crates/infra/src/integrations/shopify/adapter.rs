//! Shopify adapter: session handling, probes and paginated pulls

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Method;
use serde_json::Value;
use syncbridge_core::{RecordSink, SystemAdapter};
use syncbridge_domain::{
    ConnectionConfig, ConnectionTestReport, DataType, Result, SyncBridgeError, SyncOptions,
    SyncOutcome, SystemType,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::types::{next_page, LocationsEnvelope, Resource, Shop, ShopEnvelope};
use crate::http::HttpClient;
use crate::integrations::{deliver_batch, is_connectivity_failure};

const DEFAULT_API_VERSION: &str = "2024-07";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Largest `limit` the Admin REST API accepts per page.
const MAX_PAGE_SIZE: u32 = 250;

const CAPABILITIES: [DataType; 4] =
    [DataType::Products, DataType::Orders, DataType::Customers, DataType::Inventory];

/// Resolved endpoint and credentials for one store
#[derive(Clone)]
struct ShopifySession {
    api_base: Url,
    access_token: String,
    location_ids: Option<String>,
}

impl ShopifySession {
    fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let shop_url = config.require_str("shop_url")?;
        let access_token = config.require_str("access_token")?;
        let version = config.get_str("api_version").unwrap_or(DEFAULT_API_VERSION);

        let origin = if shop_url.contains("://") {
            shop_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", shop_url.trim_end_matches('/'))
        };
        let api_base = Url::parse(&format!("{origin}/admin/api/{version}/")).map_err(|err| {
            SyncBridgeError::Config(format!("invalid shop_url '{shop_url}': {err}"))
        })?;

        Ok(Self {
            api_base,
            access_token: access_token.to_string(),
            location_ids: config.get_str("location_ids").map(str::to_string),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|err| SyncBridgeError::Internal(format!("invalid Shopify path {path}: {err}")))
    }
}

/// Adapter for Shopify stores via the Admin REST API
///
/// Config keys: `shop_url` and `access_token` (required), `api_version`,
/// `location_ids` (comma-separated; discovered when absent).
pub struct ShopifyAdapter {
    http: HttpClient,
    sink: Arc<dyn RecordSink>,
    config: RwLock<ConnectionConfig>,
    session: RwLock<Option<ShopifySession>>,
}

impl ShopifyAdapter {
    pub fn new(http: HttpClient, sink: Arc<dyn RecordSink>, config: ConnectionConfig) -> Self {
        Self { http, sink, config: RwLock::new(config), session: RwLock::new(None) }
    }

    fn current_session(&self) -> Option<ShopifySession> {
        self.session.read().clone()
    }

    async fn get<T>(&self, session: &ShopifySession, url: Url) -> Result<(reqwest::header::HeaderMap, T)>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self
            .http
            .request(Method::GET, url)
            .header(ACCESS_TOKEN_HEADER, session.access_token.as_str());
        self.http.send_json_with_headers(request).await
    }

    async fn fetch_shop(&self, session: &ShopifySession) -> Result<Shop> {
        let (_, envelope): (_, ShopEnvelope) = self.get(session, session.endpoint("shop.json")?).await?;
        Ok(envelope.shop)
    }

    async fn location_ids(&self, session: &ShopifySession) -> Result<String> {
        if let Some(ids) = &session.location_ids {
            return Ok(ids.clone());
        }
        let (_, envelope): (_, LocationsEnvelope) =
            self.get(session, session.endpoint("locations.json")?).await?;
        let ids: Vec<String> = envelope.locations.iter().map(|l| l.id.to_string()).collect();
        Ok(ids.join(","))
    }

    /// Pull every page of one collection into the sink.
    ///
    /// Records delivered before an error stay counted in `outcome`.
    async fn pull(
        &self,
        session: &ShopifySession,
        options: &SyncOptions,
        data_type: DataType,
        outcome: &mut SyncOutcome,
    ) -> Result<()> {
        let resource = Resource::for_data_type(data_type);
        let mut url = session.endpoint(resource.path)?;
        let location_ids = match data_type {
            DataType::Inventory => Some(self.location_ids(session).await?),
            _ => None,
        };
        if location_ids.as_deref() == Some("") {
            debug!(system_id = %options.system_id, "store has no locations; nothing to pull");
            return Ok(());
        }

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &options.batch_size.clamp(1, MAX_PAGE_SIZE).to_string());
            if data_type == DataType::Orders {
                query.append_pair("status", "any");
            }
            if let Some(ids) = &location_ids {
                query.append_pair("location_ids", ids);
            }
            if let Some(since) = options.since {
                query.append_pair("updated_at_min", &since.to_rfc3339());
            }
        }

        let mut next = Some(url);
        let mut pages = 0usize;
        while let Some(page) = next.take() {
            let (headers, body): (_, Value) = self.get(session, page).await?;
            let records = body.get(resource.key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
            if records.is_empty() {
                break;
            }
            pages += 1;
            deliver_batch(self.sink.as_ref(), &options.system_id, data_type, records, outcome).await;
            next = next_page(&headers);
        }

        debug!(system_id = %options.system_id, %data_type, pages, "finished Shopify pull");
        Ok(())
    }
}

#[async_trait]
impl SystemAdapter for ShopifyAdapter {
    fn system_type(&self) -> SystemType {
        SystemType::Shopify
    }

    fn capabilities(&self) -> &[DataType] {
        &CAPABILITIES
    }

    #[instrument(skip_all)]
    async fn connect(&self, config: &ConnectionConfig) -> Result<bool> {
        let session = ShopifySession::from_config(config)?;

        match self.fetch_shop(&session).await {
            Ok(shop) => {
                info!(
                    shop = %shop.name,
                    domain = shop.myshopify_domain.as_deref().unwrap_or_default(),
                    "connected to Shopify store"
                );
                *self.config.write() = config.clone();
                *self.session.write() = Some(session);
                Ok(true)
            }
            Err(err) if is_connectivity_failure(&err) => {
                warn!(error = %err, "Shopify rejected the connection");
                *self.session.write() = None;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        if self.session.write().take().is_some() {
            debug!("Shopify session released");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    async fn test_connection(&self) -> Result<ConnectionTestReport> {
        let session = match self.current_session() {
            Some(session) => session,
            None => {
                let config = self.config.read().clone();
                match ShopifySession::from_config(&config) {
                    Ok(session) => session,
                    Err(err) => return Ok(ConnectionTestReport::failed(err.to_string(), 0)),
                }
            }
        };

        let started = Instant::now();
        let result = self.fetch_shop(&session).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(match result {
            Ok(shop) => ConnectionTestReport::ok(format!("connected to {}", shop.name), elapsed_ms),
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
                // Revoked credentials will fail every other collection too.
                Err(err @ SyncBridgeError::Auth(_)) => return Err(err),
                Err(err) => {
                    warn!(%data_type, error = %err, "Shopify pull failed");
                    outcome.record_error(format!("{data_type}: {err}"));
                }
            }
        }
        Ok(outcome)
    }
}
