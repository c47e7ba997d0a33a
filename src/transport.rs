//! The HTTP exchange boundary.
//!
//! [`Transport`] performs exactly one request/response exchange. The client
//! never talks to the network directly, so a transport can be swapped for a
//! stub that returns a fixed response.

use crate::request::CachePolicy;
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use url::Url;

/// A fully-resolved outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute request URL.
    pub url: Url,
    /// Request headers, including any `Content-Type` derived from the descriptor.
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
    /// Cache directive to pass along with the request.
    pub cache_policy: CachePolicy,
    /// How long to wait for the exchange before giving up.
    pub timeout: Duration,
}

/// The raw inbound response, before any status classification.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The full response body.
    pub body: Vec<u8>,
}

/// A failure that prevented a response from being received.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange did not finish within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The exchange was cancelled before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            TransportError::Body(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations return `Ok` for every response that was received,
/// whatever its status; status classification happens in the client.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use courier::transport::{Transport, TransportError, TransportRequest, TransportResponse};
/// use http::{HeaderMap, StatusCode};
///
/// /// Answers every request with the same body.
/// struct Canned(&'static str);
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse {
///             status: StatusCode::OK,
///             headers: HeaderMap::new(),
///             body: self.0.as_bytes().to_vec(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and waits for the complete response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// The default transport, backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut headers = request.headers;
        if !headers.contains_key(http::header::CACHE_CONTROL) {
            if let Some(directive) = request.cache_policy.cache_control() {
                headers.insert(
                    http::header::CACHE_CONTROL,
                    http::HeaderValue::from_static(directive),
                );
            }
        }

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(headers)
            .timeout(request.timeout);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
