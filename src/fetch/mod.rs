//! HTTP transport for the stats backend.
//!
//! A thin typed wrapper over reqwest: builds `/api` URLs, classifies
//! failures into the taxonomy the retry policy needs, and decodes JSON
//! bodies. All service clients go through [`ApiClient`].

pub mod retry;

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use retry::{retry_with_backoff, Retryable, RetryConfig};

/// Errors surfaced by the transport and service layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: the requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Other 4xx: the request itself is wrong; never retried
    #[error("HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx: the backend failed; retried up to the configured limit
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Connection-level failure; retried up to the configured limit
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A hard deadline elapsed; never retried
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The body did not decode; retrying will not fix a parse error
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Terminal result of an exhausted retry loop
    #[error("giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ApiError>,
    },
}

impl Retryable for ApiError {
    fn is_transient(&self) -> bool {
        matches!(self, ApiError::Server { .. } | ApiError::Network(_))
    }

    fn into_exhausted(self, attempts: u32) -> Self {
        ApiError::RetriesExhausted {
            attempts,
            source: Box::new(self),
        }
    }
}

/// Error body shape used by the backend for failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend base URL (the `/api` prefix is appended per request)
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retry policy applied to every request
    pub retry: RetryConfig,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Typed JSON client for the stats backend.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("bad base URL {}: {}", config.base_url, e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            retry: config.retry,
        })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, ApiError> {
        Self::new(ApiClientConfig::default())
    }

    /// The retry policy this client applies.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Build the full URL for an `/api` endpoint path.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let path = format!("/api/{}", path.trim_start_matches('/'));
        self.base_url
            .join(&path)
            .map_err(|e| ApiError::InvalidUrl(format!("bad endpoint {}: {}", path, e)))
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, query, None).await
    }

    /// POST a JSON body to an endpoint and decode the response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request_json(Method::POST, path, &[], Some(body)).await
    }

    /// PUT a JSON body to an endpoint and decode the response.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request_json(Method::PUT, path, &[], Some(body)).await
    }

    /// DELETE an endpoint and decode the response.
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.request_json(Method::DELETE, path, &[], body).await
    }

    /// Perform a request through the retry policy and decode the body.
    ///
    /// Retries are strictly sequential; a request is never retried
    /// concurrently with itself.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        retry_with_backoff(
            || self.execute(method.clone(), url.clone(), query, body),
            &self.retry,
        )
        .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Map a non-2xx response to an error, preferring the server's own
    /// message and falling back to "HTTP {status}: {statusText}".
    async fn status_error(status: StatusCode, response: reqwest::Response) -> ApiError {
        let fallback = format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.or(body.message).unwrap_or(fallback),
            Err(_) => fallback,
        };

        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(message)
        } else if status.is_client_error() {
            ApiError::Client {
                status: status.as_u16(),
                message,
            }
        } else {
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}
