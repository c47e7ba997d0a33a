//! The request executor.
//!
//! [`NetworkClient`] runs every call through one pipeline (build, dispatch,
//! classify, decode) and exposes it three ways:
//!
//! - [`NetworkClient::perform`] / [`NetworkClient::send`]: `async`, awaited by the caller;
//! - [`NetworkClient::perform_stream`]: a stream that yields exactly one item;
//! - [`NetworkClient::perform_with`]: a completion closure invoked exactly once.
//!
//! For the same descriptor and the same transport response all three yield
//! the same value or the same [`NetworkError`].

use crate::{
    decoder::SelfDecodable,
    endpoint::{Endpoint, UrlHost, UrlScheme},
    request::{CachePolicy, RequestBuilder, RequestTask, DEFAULT_TIMEOUT},
    transport::{ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse},
    NetworkError, Response, Result,
};
use futures::Stream;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The single-item stream returned by [`NetworkClient::perform_stream`].
pub type RequestStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Longest body prefix written by the stream form's exchange log.
const BODY_PREVIEW_BYTES: usize = 512;

/// Executes request descriptors and decodes their responses.
///
/// The client is cheap to clone and meant to be shared. Its configuration is
/// read-only once built.
///
/// # Examples
///
/// ```no_run
/// use courier::{Endpoint, JsonDecoder, NetworkClient, SelfDecodable};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// impl SelfDecodable for Person {
///     const DECODER: JsonDecoder = JsonDecoder::SNAKE_CASE;
/// }
///
/// # async fn example() -> Result<(), courier::NetworkError> {
/// let client = NetworkClient::builder()
///     .default_host("api.example.com")
///     .build()?;
///
/// let request = client.request(Endpoint::new("/people/1")).build();
///
/// // async/await
/// let person: Person = client.perform(&request).await?;
/// println!("{} {}", person.first_name, person.last_name);
///
/// // completion closure
/// client.perform_with(&request, |result: Result<Person, _>| {
///     println!("{:?}", result);
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NetworkClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    default_host: UrlHost,
    default_scheme: UrlScheme,
    default_headers: HeaderMap,
    timeout: Duration,
    cache_policy: CachePolicy,
}

/// A response that passed status classification.
struct Exchange {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    latency: Duration,
}

impl NetworkClient {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The host used for requests that do not override it.
    pub fn default_host(&self) -> &UrlHost {
        &self.inner.default_host
    }

    /// Starts a [`Request`](crate::Request) for `endpoint`, seeded with this
    /// client's host, scheme, headers, timeout and cache policy.
    ///
    /// Every seeded value can be overridden on the returned builder.
    pub fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        RequestBuilder::new(endpoint, self.inner.default_host.clone())
            .scheme(self.inner.default_scheme.clone())
            .headers(self.inner.default_headers.clone())
            .timeout(self.inner.timeout)
            .cache_policy(self.inner.cache_policy)
    }

    /// Performs the request and decodes the body into `T`.
    ///
    /// Dropping the returned future aborts the exchange.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::InvalidRequest`] if the descriptor cannot be turned into a request;
    /// - [`NetworkError::TransportFailure`] if no response was received;
    /// - the status-mapped error for a response outside `200..300`;
    /// - [`NetworkError::DecodingError`] if the body does not decode into `T`.
    pub async fn perform<T>(&self, task: &impl RequestTask) -> Result<T>
    where
        T: SelfDecodable,
    {
        self.send(task).await.map(Response::into_data)
    }

    /// Like [`NetworkClient::perform`], but keeps the status, headers and
    /// latency of the exchange.
    pub async fn send<T>(&self, task: &impl RequestTask) -> Result<Response<T>>
    where
        T: SelfDecodable,
    {
        let request = task.transport_request()?;
        let exchange = self.pipeline(request, None).await?;
        let data = decode::<T>(&exchange.body)?;
        Ok(Response::new(
            data,
            exchange.status,
            exchange.headers,
            exchange.latency,
        ))
    }

    /// Performs the request, delivering the outcome as a stream.
    ///
    /// The stream yields exactly one item, the decoded value or the error,
    /// and then ends. Nothing is sent until the stream is first polled, and
    /// dropping it aborts the exchange.
    ///
    /// This form also logs the raw exchange at `debug` level before the
    /// status is classified.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use courier::{Endpoint, NetworkClient};
    /// use futures::StreamExt;
    ///
    /// # async fn example() -> Result<(), courier::NetworkError> {
    /// let client = NetworkClient::builder()
    ///     .default_host("api.example.com")
    ///     .build()?;
    ///
    /// let request = client.request(Endpoint::new("/status")).build();
    /// let mut stream = client.perform_stream::<serde_json::Value>(&request);
    ///
    /// while let Some(result) = stream.next().await {
    ///     println!("{:?}", result);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn perform_stream<T>(&self, task: &impl RequestTask) -> RequestStream<T>
    where
        T: SelfDecodable + Send + 'static,
    {
        let client = self.clone();
        let request = task.transport_request();

        Box::pin(futures::stream::once(async move {
            match request {
                Ok(request) => client.execute::<T>(request, Some(log_exchange)).await,
                Err(e) => Err(e),
            }
        }))
    }

    /// Performs the request and hands the outcome to `completion`.
    ///
    /// `completion` is invoked exactly once. If the descriptor cannot be
    /// turned into a request it is invoked before this method returns;
    /// otherwise the exchange runs on the current Tokio runtime and
    /// `completion` is invoked from there.
    ///
    /// Cancelling through the returned [`RequestHandle`] aborts the exchange
    /// and completes with `TransportFailure(TransportError::Cancelled)`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime while the request is valid.
    pub fn perform_with<T, F>(&self, task: &impl RequestTask, completion: F) -> RequestHandle
    where
        T: SelfDecodable + Send + 'static,
        F: FnOnce(Result<T>) + Send + 'static,
    {
        let token = CancellationToken::new();

        let request = match task.transport_request() {
            Ok(request) => request,
            Err(e) => {
                completion(Err(e));
                return RequestHandle { token, join: None };
            }
        };

        let client = self.clone();
        let cancelled = token.clone();
        let join = tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    tracing::warn!("Request cancelled before completion");
                    Err(NetworkError::TransportFailure(TransportError::Cancelled))
                }
                result = client.execute::<T>(request, None) => result,
            };
            completion(result);
        });

        RequestHandle {
            token,
            join: Some(join),
        }
    }

    async fn execute<T>(
        &self,
        request: TransportRequest,
        observe: Option<fn(&TransportResponse)>,
    ) -> Result<T>
    where
        T: SelfDecodable,
    {
        let exchange = self.pipeline(request, observe).await?;
        decode::<T>(&exchange.body)
    }

    /// Dispatches the request and classifies what comes back.
    async fn pipeline(
        &self,
        request: TransportRequest,
        observe: Option<fn(&TransportResponse)>,
    ) -> Result<Exchange> {
        let start_time = Instant::now();
        let response = self.dispatch(request).await?;

        if let Some(observe) = observe {
            observe(&response);
        }

        classify_response(response, start_time.elapsed())
    }

    async fn dispatch(&self, request: TransportRequest) -> Result<TransportResponse> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            timeout_ms = request.timeout.as_millis() as u64,
            "Executing HTTP request"
        );

        let timeout = request.timeout;
        let outcome = match tokio::time::timeout(timeout, self.inner.transport.send(request)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout),
        };

        outcome.map_err(|e| {
            tracing::warn!(error = %e, "Transport failure");
            NetworkError::from_transport_error(Box::new(e))
        })
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("default_host", &self.inner.default_host)
            .field("default_scheme", &self.inner.default_scheme)
            .field("timeout", &self.inner.timeout)
            .field("cache_policy", &self.inner.cache_policy)
            .finish_non_exhaustive()
    }
}

fn classify_response(response: TransportResponse, latency: Duration) -> Result<Exchange> {
    let status = response.status;

    tracing::info!(
        status = status.as_u16(),
        latency_ms = latency.as_millis() as u64,
        "Received HTTP response"
    );

    if !status.is_success() {
        let error = NetworkError::from_status(status.as_u16());
        if status.is_client_error() {
            tracing::error!(status = status.as_u16(), error = %error, "Client error (4xx)");
        } else if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %error, "Server error (5xx)");
        }
        return Err(error);
    }

    Ok(Exchange {
        status,
        headers: response.headers,
        body: response.body,
        latency,
    })
}

fn decode<T: SelfDecodable>(body: &[u8]) -> Result<T> {
    T::DECODER.decode::<T>(body).map_err(|e| {
        tracing::error!(
            error = %e,
            target_type = std::any::type_name::<T>(),
            "Failed to decode response"
        );
        NetworkError::DecodingError
    })
}

fn log_exchange(response: &TransportResponse) {
    let preview = &response.body[..response.body.len().min(BODY_PREVIEW_BYTES)];
    tracing::debug!(
        status = response.status.as_u16(),
        bytes = response.body.len(),
        body = %String::from_utf8_lossy(preview),
        "Raw HTTP exchange"
    );
}

/// Handle to a request started with [`NetworkClient::perform_with`].
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct RequestHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl RequestHandle {
    /// Aborts the exchange if it is still in flight.
    ///
    /// The completion then receives `TransportFailure(TransportError::Cancelled)`.
    /// Has no effect once the completion has run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the completion has run.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits until the completion has run.
    pub async fn wait(self) {
        if let Some(join) = self.join {
            if let Err(e) = join.await {
                tracing::error!(error = %e, "Completion task failed");
            }
        }
    }
}

/// Builder for configuring and creating a [`NetworkClient`].
///
/// # Examples
///
/// ```no_run
/// use courier::{CachePolicy, ClientBuilder, UrlScheme};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), courier::NetworkError> {
/// let client = ClientBuilder::new()
///     .default_host("api.example.com")
///     .default_scheme(UrlScheme::Https)
///     .timeout(Duration::from_secs(10))
///     .cache_policy(CachePolicy::ReloadIgnoringLocalCacheData)
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    default_host: Option<UrlHost>,
    default_scheme: UrlScheme,
    default_headers: HeaderMap,
    timeout: Duration,
    cache_policy: CachePolicy,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            default_host: None,
            default_scheme: UrlScheme::default(),
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            cache_policy: CachePolicy::default(),
            transport: None,
        }
    }

    /// Sets the host used by requests that do not name their own.
    pub fn default_host(mut self, host: impl Into<UrlHost>) -> Self {
        self.default_host = Some(host.into());
        self
    }

    /// Sets the scheme used by requests that do not name their own.
    pub fn default_scheme(mut self, scheme: UrlScheme) -> Self {
        self.default_scheme = scheme;
        self
    }

    /// Adds a header included in every request built with [`NetworkClient::request`].
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name =
            HeaderName::try_from(name.as_ref()).map_err(|_| NetworkError::InvalidRequest)?;
        let value =
            HeaderValue::try_from(value.as_ref()).map_err(|_| NetworkError::InvalidRequest)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the default cache directive.
    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    /// Replaces the HTTP transport.
    ///
    /// By default a [`ReqwestTransport`] is used.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the configured `NetworkClient`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if no default host was set,
    /// or a transport failure if the default transport cannot be created.
    pub fn build(self) -> Result<NetworkClient> {
        let default_host = self.default_host.ok_or_else(|| {
            tracing::error!("A default host is required to build a client");
            NetworkError::InvalidRequest
        })?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(NetworkClient {
            inner: Arc::new(ClientInner {
                transport,
                default_host,
                default_scheme: self.default_scheme,
                default_headers: self.default_headers,
                timeout: self.timeout,
                cache_policy: self.cache_policy,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonDecoder, Request};
    use async_trait::async_trait;
    use futures::StreamExt;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const VALID_JSON: &str = r#"{"first_name": "Dushant", "last_name": "Singh"}"#;
    const INVALID_JSON: &str = "{}";

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TestDecodable {
        first_name: String,
        last_name: String,
    }

    impl SelfDecodable for TestDecodable {
        const DECODER: JsonDecoder = JsonDecoder::SNAKE_CASE;
    }

    /// Answers every request with the same outcome, whatever was asked.
    struct FixedTransport {
        outcome: std::result::Result<(u16, &'static str), TransportError>,
        seen: Arc<Mutex<Vec<TransportRequest>>>,
    }

    impl FixedTransport {
        fn respond(status: u16, body: &'static str) -> Self {
            Self {
                outcome: Ok((status, body)),
                seen: Arc::default(),
            }
        }

        fn fail(error: TransportError) -> Self {
            Self {
                outcome: Err(error),
                seen: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            let (status, body) = self.outcome.clone()?;
            Ok(TransportResponse {
                status: StatusCode::from_u16(status).unwrap(),
                headers: HeaderMap::new(),
                body: body.as_bytes().to_vec(),
            })
        }
    }

    /// Never answers.
    struct SilentTransport;

    #[async_trait]
    impl Transport for SilentTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            futures::future::pending().await
        }
    }

    /// Never answers, and records when an exchange starts and when it is dropped.
    #[derive(Default)]
    struct TrackedTransport {
        started: Arc<AtomicBool>,
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Transport for TrackedTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            let _flag = DropFlag(self.dropped.clone());
            self.started.store(true, Ordering::SeqCst);
            futures::future::pending().await
        }
    }

    fn client_with(transport: impl Transport + 'static) -> NetworkClient {
        NetworkClient::builder()
            .default_host("google.com")
            .transport(transport)
            .build()
            .unwrap()
    }

    /// Runs `request` through the async, stream and callback forms.
    async fn perform_all<T>(client: &NetworkClient, request: &Request) -> [Result<T>; 3]
    where
        T: SelfDecodable + Send + 'static,
    {
        let awaited = client.perform::<T>(request).await;

        let mut stream = client.perform_stream::<T>(request);
        let streamed = stream.next().await.expect("stream yields one item");
        assert!(stream.next().await.is_none(), "stream ends after one item");

        let (tx, rx) = tokio::sync::oneshot::channel();
        client.perform_with::<T, _>(request, move |result| {
            let _ = tx.send(result);
        });
        let completed = rx.await.expect("completion invoked");

        [awaited, streamed, completed]
    }

    #[tokio::test]
    async fn test_success_is_identical_across_forms() {
        let client = client_with(FixedTransport::respond(200, VALID_JSON));
        let request = client.request(Endpoint::new("/good-url")).build();

        let expected = TestDecodable {
            first_name: "Dushant".to_string(),
            last_name: "Singh".to_string(),
        };
        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(result, Ok(expected.clone()));
        }
    }

    #[tokio::test]
    async fn test_not_found_is_identical_across_forms() {
        let client = client_with(FixedTransport::respond(404, INVALID_JSON));
        let request = client.request(Endpoint::new("/not-found-endpoint")).build();

        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(result, Err(NetworkError::NotFound));
        }
    }

    #[tokio::test]
    async fn test_status_classification_is_identical_across_forms() {
        for (status, expected) in [
            (400, NetworkError::BadRequest),
            (401, NetworkError::Unauthorized),
            (403, NetworkError::Forbidden),
            (409, NetworkError::ClientError4xx(409)),
            (500, NetworkError::ServerError),
            (503, NetworkError::ServerError5xx(503)),
            (304, NetworkError::UnknownError),
        ] {
            let client = client_with(FixedTransport::respond(status, VALID_JSON));
            let request = client.request(Endpoint::new("/status")).build();

            for result in perform_all::<TestDecodable>(&client, &request).await {
                assert_eq!(result, Err(expected.clone()), "status {}", status);
            }
        }
    }

    #[tokio::test]
    async fn test_decoding_error_is_identical_across_forms() {
        let client = client_with(FixedTransport::respond(200, INVALID_JSON));
        let request = client.request(Endpoint::new("/good-url-bad-json")).build();

        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(result, Err(NetworkError::DecodingError));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_identical_across_forms() {
        let failure = TransportError::Connect("connection refused".to_string());
        let client = client_with(FixedTransport::fail(failure.clone()));
        let request = client.request(Endpoint::new("/good-url")).build();

        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(result, Err(NetworkError::TransportFailure(failure.clone())));
        }
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_transport() {
        let transport = FixedTransport::respond(200, VALID_JSON);
        let seen = transport.seen.clone();
        let client = client_with(transport);
        let request = client.request(Endpoint::new("?=")).build();

        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(result, Err(NetworkError::InvalidRequest));
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_completes_before_returning() {
        let client = client_with(FixedTransport::respond(200, VALID_JSON));
        let request = client.request(Endpoint::new("?=")).build();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();
        let handle = client.perform_with::<TestDecodable, _>(&request, move |result| {
            recorded.lock().unwrap().push(result);
        });

        assert!(handle.is_finished());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Err(NetworkError::InvalidRequest)]
        );
    }

    #[tokio::test]
    async fn test_completion_fires_exactly_once() {
        let cases = [
            FixedTransport::respond(200, VALID_JSON),
            FixedTransport::respond(404, VALID_JSON),
            FixedTransport::respond(200, INVALID_JSON),
            FixedTransport::fail(TransportError::Timeout),
        ];

        for transport in cases {
            let client = client_with(transport);
            let request = client.request(Endpoint::new("/good-url")).build();
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();

            let handle = client.perform_with::<TestDecodable, _>(&request, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            handle.wait().await;

            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_failure() {
        let client = client_with(SilentTransport);
        let request = client
            .request(Endpoint::new("/slow"))
            .timeout(Duration::from_millis(20))
            .build();

        for result in perform_all::<TestDecodable>(&client, &request).await {
            assert_eq!(
                result,
                Err(NetworkError::TransportFailure(TransportError::Timeout))
            );
        }
    }

    #[tokio::test]
    async fn test_cancel_completes_with_cancelled() {
        let client = client_with(SilentTransport);
        let request = client.request(Endpoint::new("/slow")).build();

        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = client.perform_with::<TestDecodable, _>(&request, move |result| {
            let _ = tx.send(result);
        });
        assert!(!handle.is_finished());

        handle.cancel();

        assert_eq!(
            rx.await.unwrap(),
            Err(NetworkError::TransportFailure(TransportError::Cancelled))
        );
        handle.wait().await;
    }

    #[tokio::test]
    async fn test_dropping_the_future_aborts_the_exchange() {
        let transport = TrackedTransport::default();
        let started = transport.started.clone();
        let dropped = transport.dropped.clone();
        let client = client_with(transport);
        let request = client.request(Endpoint::new("/slow")).build();

        let mut call = Box::pin(client.perform::<TestDecodable>(&request));
        let polled = tokio::time::timeout(Duration::from_millis(20), &mut call).await;
        assert!(polled.is_err(), "exchange should still be pending");
        assert!(started.load(Ordering::SeqCst));
        assert!(!dropped.load(Ordering::SeqCst));

        drop(call);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropping_the_stream_aborts_the_exchange() {
        let transport = TrackedTransport::default();
        let started = transport.started.clone();
        let dropped = transport.dropped.clone();
        let client = client_with(transport);
        let request = client.request(Endpoint::new("/slow")).build();

        let mut stream = client.perform_stream::<TestDecodable>(&request);
        let polled = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
        assert!(polled.is_err(), "exchange should still be pending");
        assert!(started.load(Ordering::SeqCst));
        assert!(!dropped.load(Ordering::SeqCst));

        drop(stream);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let transport = FixedTransport::respond(200, VALID_JSON);
        let seen = transport.seen.clone();
        let client = client_with(transport);
        let request = client.request(Endpoint::new("/good-url")).build();

        let stream = client.perform_stream::<TestDecodable>(&request);
        assert!(seen.lock().unwrap().is_empty());
        drop(stream);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_keeps_metadata() {
        let client = client_with(FixedTransport::respond(201, VALID_JSON));
        let request = client.request(Endpoint::new("/people")).build();

        let response = client.send::<TestDecodable>(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.first_name, "Dushant");
    }

    #[tokio::test]
    async fn test_request_is_seeded_from_client() {
        let transport = FixedTransport::respond(200, "[]");
        let seen = transport.seen.clone();
        let client = NetworkClient::builder()
            .default_host("api.example.com")
            .default_scheme(UrlScheme::Http)
            .default_header("x-api-version", "3")
            .unwrap()
            .timeout(Duration::from_secs(7))
            .cache_policy(CachePolicy::ReturnCacheDataDontLoad)
            .transport(transport)
            .build()
            .unwrap();

        let seeded = client.request(Endpoint::new("/a")).build();
        let overridden = client
            .request(Endpoint::new("/b"))
            .host("other.example.com")
            .build();

        let _: Vec<TestDecodable> = client.perform(&seeded).await.unwrap();
        let _: Vec<TestDecodable> = client.perform(&overridden).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].url.as_str(), "http://api.example.com/a");
        assert_eq!(seen[0].headers["x-api-version"], "3");
        assert_eq!(seen[0].timeout, Duration::from_secs(7));
        assert_eq!(seen[0].cache_policy, CachePolicy::ReturnCacheDataDontLoad);
        assert_eq!(seen[1].url.as_str(), "http://other.example.com/b");
    }

    #[test]
    fn test_builder_requires_default_host() {
        let result = NetworkClient::builder()
            .transport(FixedTransport::respond(200, VALID_JSON))
            .build();
        assert!(matches!(result, Err(NetworkError::InvalidRequest)));
    }
}
