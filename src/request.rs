//! Request descriptors.
//!
//! [`RequestTask`] describes everything needed for one HTTP call. [`Request`]
//! is the ready-made implementation, assembled with a [`RequestBuilder`].

use crate::endpoint::{Endpoint, UrlHost, UrlScheme};
use crate::transport::TransportRequest;
use crate::NetworkError;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;

/// How long a request may take before it is abandoned.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP methods a descriptor can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// The canonical uppercase verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

/// The media type of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// `application/json`
    #[default]
    Json,
    /// `application/xml`
    Xml,
    /// Any other MIME type, used verbatim.
    Other(String),
}

impl ContentType {
    /// The MIME string.
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
            ContentType::Other(mime) => mime,
        }
    }
}

/// Cache directive forwarded with a request.
///
/// The library does not cache anything itself. The policy is handed to the
/// transport, which for HTTP means a `Cache-Control` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Leave caching to the protocol; no directive is sent.
    UseProtocolCachePolicy,
    /// Always load from the origin.
    ReloadIgnoringLocalCacheData,
    /// Use a cached response if present, otherwise load from the network.
    /// This is a local cache preference; no directive is sent.
    #[default]
    ReturnCacheDataElseLoad,
    /// Only use a cached response; never load from the network.
    ReturnCacheDataDontLoad,
}

impl CachePolicy {
    /// The `Cache-Control` request directive for this policy, if any.
    pub fn cache_control(&self) -> Option<&'static str> {
        match self {
            CachePolicy::UseProtocolCachePolicy | CachePolicy::ReturnCacheDataElseLoad => None,
            CachePolicy::ReloadIgnoringLocalCacheData => Some("no-cache"),
            CachePolicy::ReturnCacheDataDontLoad => Some("only-if-cached"),
        }
    }
}

/// Everything needed to perform one HTTP call.
///
/// Only the endpoint and host are required; the other accessors default to
/// an HTTPS `GET` of JSON with no body, no extra headers, the
/// [`CachePolicy::ReturnCacheDataElseLoad`] policy and a 30 second timeout.
///
/// Implement this for your own route types, or use [`Request`].
///
/// # Examples
///
/// ```
/// use courier::{Endpoint, RequestTask, UrlHost};
///
/// struct CountryByCode {
///     code: String,
/// }
///
/// impl RequestTask for CountryByCode {
///     fn endpoint(&self) -> Endpoint {
///         Endpoint::new(format!("/v3.1/alpha/{}", self.code))
///     }
///
///     fn host(&self) -> UrlHost {
///         UrlHost::new("restcountries.com")
///     }
/// }
///
/// let request = CountryByCode { code: "ca".to_string() }.transport_request().unwrap();
/// assert_eq!(request.url.as_str(), "https://restcountries.com/v3.1/alpha/ca");
/// ```
pub trait RequestTask {
    /// The resource to request.
    fn endpoint(&self) -> Endpoint;

    /// The host serving the resource.
    fn host(&self) -> UrlHost;

    /// The URL scheme.
    fn scheme(&self) -> UrlScheme {
        UrlScheme::Https
    }

    /// The HTTP method.
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// The media type of the body.
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    /// The request body.
    fn body(&self) -> Option<Vec<u8>> {
        None
    }

    /// Extra request headers.
    fn headers(&self) -> Option<HeaderMap> {
        None
    }

    /// The cache directive.
    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::default()
    }

    /// The request timeout.
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Resolves this descriptor into an outbound request.
    ///
    /// A `Content-Type` header is added from [`RequestTask::content_type`]
    /// when there is a body and the headers do not already name one.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if the URL cannot be built.
    fn transport_request(&self) -> Result<TransportRequest, NetworkError> {
        let url = self.endpoint().url(&self.scheme(), &self.host())?;
        let body = self.body();
        let mut headers = self.headers().unwrap_or_default();

        if body.is_some() && !headers.contains_key(http::header::CONTENT_TYPE) {
            let value = HeaderValue::try_from(self.content_type().as_str())
                .map_err(|_| NetworkError::InvalidRequest)?;
            headers.insert(http::header::CONTENT_TYPE, value);
        }

        Ok(TransportRequest {
            method: self.method().into(),
            url,
            headers,
            body,
            cache_policy: self.cache_policy(),
            timeout: self.timeout(),
        })
    }
}

/// An immutable request descriptor.
///
/// # Examples
///
/// ```
/// use courier::{Endpoint, HttpMethod, Request, RequestTask};
///
/// let request = Request::builder(Endpoint::new("/users"), "api.example.com")
///     .method(HttpMethod::Post)
///     .body(br#"{"name":"Alice"}"#.to_vec())
///     .build();
///
/// assert_eq!(request.method(), HttpMethod::Post);
/// assert_eq!(request.host().as_str(), "api.example.com");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    scheme: UrlScheme,
    host: UrlHost,
    endpoint: Endpoint,
    method: HttpMethod,
    content_type: ContentType,
    body: Option<Vec<u8>>,
    headers: Option<HeaderMap>,
    cache_policy: CachePolicy,
    timeout: Duration,
}

impl Request {
    /// Starts building a request for `endpoint` on `host`.
    pub fn builder(endpoint: Endpoint, host: impl Into<UrlHost>) -> RequestBuilder {
        RequestBuilder::new(endpoint, host.into())
    }
}

impl RequestTask for Request {
    fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    fn host(&self) -> UrlHost {
        self.host.clone()
    }

    fn scheme(&self) -> UrlScheme {
        self.scheme.clone()
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn content_type(&self) -> ContentType {
        self.content_type.clone()
    }

    fn body(&self) -> Option<Vec<u8>> {
        self.body.clone()
    }

    fn headers(&self) -> Option<HeaderMap> {
        self.headers.clone()
    }

    fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for a [`Request`].
///
/// Obtained from [`Request::builder`] or, seeded with a client's defaults,
/// from [`NetworkClient::request`](crate::NetworkClient::request).
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub(crate) fn new(endpoint: Endpoint, host: UrlHost) -> Self {
        Self {
            request: Request {
                scheme: UrlScheme::default(),
                host,
                endpoint,
                method: HttpMethod::default(),
                content_type: ContentType::default(),
                body: None,
                headers: None,
                cache_policy: CachePolicy::default(),
                timeout: DEFAULT_TIMEOUT,
            },
        }
    }

    /// Overrides the host.
    pub fn host(mut self, host: impl Into<UrlHost>) -> Self {
        self.request.host = host.into();
        self
    }

    /// Sets the URL scheme.
    pub fn scheme(mut self, scheme: UrlScheme) -> Self {
        self.request.scheme = scheme;
        self
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Sets the body media type.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.request.content_type = content_type;
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Serializes `body` as JSON and uses it as the request body.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if serialization fails.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, NetworkError> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize request body");
            NetworkError::InvalidRequest
        })?;
        self.request.body = Some(bytes);
        self.request.content_type = ContentType::Json;
        Ok(self)
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if the header name or value is invalid.
    pub fn header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, NetworkError> {
        let name =
            HeaderName::try_from(name.as_ref()).map_err(|_| NetworkError::InvalidRequest)?;
        let value =
            HeaderValue::try_from(value.as_ref()).map_err(|_| NetworkError::InvalidRequest)?;
        self.request
            .headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        Ok(self)
    }

    /// Merges a header map into the request headers.
    ///
    /// Every name present in `headers` replaces the existing values for that
    /// name, keeping all of its values.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        if !headers.is_empty() {
            let target = self.request.headers.get_or_insert_with(HeaderMap::new);
            for name in headers.keys() {
                target.remove(name);
            }
            for (name, value) in headers.iter() {
                target.append(name.clone(), value.clone());
            }
        }
        self
    }

    /// Sets the cache directive.
    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.request.cache_policy = cache_policy;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> Request {
        self.request
    }
}
