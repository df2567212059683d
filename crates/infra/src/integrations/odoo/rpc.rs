//! Minimal JSON-RPC 2.0 client for Odoo's `/jsonrpc` endpoint

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use syncbridge_domain::{Result, SyncBridgeError};
use url::Url;

use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Error object returned in place of a result
#[derive(Debug, Deserialize)]
pub(super) struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RpcErrorData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Odoo reports expired sessions with this code.
const SESSION_EXPIRED_CODE: i64 = 100;

impl From<RpcError> for SyncBridgeError {
    fn from(err: RpcError) -> Self {
        let name = err.data.as_ref().and_then(|d| d.name.as_deref()).unwrap_or_default();
        let detail = err
            .data
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| err.message.clone());

        if err.code == SESSION_EXPIRED_CODE || name.ends_with("AccessDenied") || name.ends_with("AccessError")
        {
            SyncBridgeError::Auth(format!("odoo: {detail}"))
        } else {
            SyncBridgeError::Internal(format!("odoo rpc error {}: {detail}", err.code))
        }
    }
}

/// Sends `call` requests with monotonically increasing ids
pub(super) struct RpcClient {
    http: HttpClient,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http, next_id: AtomicU64::new(1) }
    }

    pub async fn call<T>(&self, endpoint: &Url, service: &str, method: &str, args: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams { service, method, args },
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let builder = self.http.request(Method::POST, endpoint.clone()).json(&request);
        let response: RpcResponse<T> = self.http.send_json(builder).await?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(error.into()),
            (Some(result), None) => Ok(result),
            (None, None) => Err(SyncBridgeError::Internal(format!(
                "odoo {service}.{method} returned neither result nor error"
            ))),
        }
    }
}
