//! Retrying HTTP client shared by the built-in adapters

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use syncbridge_domain::{HttpConfig, SyncBridgeError};
use tracing::debug;

use crate::errors::conversions::status_error;
use crate::errors::InfraError;

type Result<T> = std::result::Result<T, SyncBridgeError>;

/// HTTP client with built-in retry and timeout support.
///
/// Server errors, `429 Too Many Requests` and transport failures are retried
/// with exponential backoff; everything else is returned on the first try.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client tuned from the adapter HTTP settings.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_attempts)
            .base_backoff(Duration::from_millis(config.base_backoff_ms))
            .user_agent(concat!("syncbridge/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                SyncBridgeError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                SyncBridgeError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, path = url.path(), "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, path = url.path(), %status, "received HTTP response");

                    if should_retry_status(status) && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, path = url.path(), error = %err, "HTTP request failed");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    let infra: InfraError = err.into();
                    return Err(SyncBridgeError::from(infra));
                }
            }
        }

        Err(SyncBridgeError::Internal(
            "http client exhausted retries without producing a result".into(),
        ))
    }

    /// Send, reject non-success statuses and decode the JSON body.
    pub async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_json_with_headers(builder).await.map(|(_, body)| body)
    }

    /// Like [`HttpClient::send_json`], also returning the response headers
    /// (cursor pagination links, rate-limit hints).
    pub async fn send_json_with_headers<T>(&self, builder: RequestBuilder) -> Result<(HeaderMap, T)>
    where
        T: DeserializeOwned,
    {
        let response = self.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), status.canonical_reason()));
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| SyncBridgeError::from(InfraError::from(err)))?;
        let decoded =
            serde_json::from_slice(&body).map_err(|err| SyncBridgeError::from(InfraError::from(err)))?;
        Ok((headers, decoded))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        let defaults = HttpConfig::default();
        Self {
            timeout: Duration::from_secs(defaults.timeout_secs),
            max_attempts: defaults.max_attempts,
            base_backoff: Duration::from_millis(defaults.base_backoff_ms),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            SyncBridgeError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
