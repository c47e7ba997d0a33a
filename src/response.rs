//! Decoded responses with their HTTP metadata.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded value together with the details of the exchange that produced it.
///
/// Returned by [`NetworkClient::send`](crate::NetworkClient::send). The other
/// calling conventions hand back the bare value.
///
/// # Examples
///
/// ```no_run
/// use courier::{Endpoint, NetworkClient};
///
/// # async fn example() -> Result<(), courier::NetworkError> {
/// let client = NetworkClient::builder()
///     .default_host("api.example.com")
///     .build()?;
///
/// let request = client.request(Endpoint::new("/status")).build();
/// let response = client.send::<serde_json::Value>(&request).await?;
///
/// println!("{} in {:?}: {}", response.status, response.latency, response.data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded body.
    pub data: T,

    /// The HTTP status code, always in `200..300`.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from dispatch until the body was fully received.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(data: T, status: StatusCode, headers: HeaderMap, latency: Duration) -> Self {
        Self {
            data,
            status,
            headers,
            latency,
        }
    }

    /// Maps the decoded value, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use courier::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(42, StatusCode::OK, HeaderMap::new(), Duration::from_millis(5));
    ///
    /// let text = response.map(|n| n.to_string());
    /// assert_eq!(text.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns a header value by name, if present and valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// # use courier::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = Response::new((), StatusCode::OK, headers, Duration::ZERO);
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response, returning the decoded value.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
