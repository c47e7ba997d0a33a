//! Endpoint definitions and URL construction.
//!
//! An [`Endpoint`] names a remote resource independently of where it lives.
//! Combining it with a [`UrlScheme`] and a [`UrlHost`] yields an absolute
//! [`Url`].

use crate::NetworkError;
use std::fmt;
use url::Url;

/// The scheme portion of a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum UrlScheme {
    /// `http`
    Http,
    /// `https`
    #[default]
    Https,
    /// Any other scheme, used verbatim.
    Other(String),
}

impl UrlScheme {
    /// Returns the textual form of the scheme.
    pub fn as_str(&self) -> &str {
        match self {
            UrlScheme::Http => "http",
            UrlScheme::Https => "https",
            UrlScheme::Other(scheme) => scheme,
        }
    }
}

impl fmt::Display for UrlScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host name, optionally with a port (`"api.example.com"`, `"127.0.0.1:8080"`).
///
/// The host is not validated here. An empty or malformed host is reported
/// as [`NetworkError::InvalidRequest`] when a URL is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlHost(String);

impl UrlHost {
    /// Wraps a raw host string.
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    /// Returns the raw host string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UrlHost {
    fn from(host: &str) -> Self {
        Self::new(host)
    }
}

impl From<String> for UrlHost {
    fn from(host: String) -> Self {
        Self(host)
    }
}

impl fmt::Display for UrlHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path plus ordered query parameters identifying a remote resource.
///
/// # Examples
///
/// ```
/// use courier::{Endpoint, UrlHost, UrlScheme};
///
/// let endpoint = Endpoint::new("/v1/countries")
///     .query("region", "europe")
///     .query("limit", "10");
///
/// let url = endpoint
///     .url(&UrlScheme::Https, &UrlHost::new("api.example.com"))
///     .unwrap();
///
/// assert_eq!(
///     url.as_str(),
///     "https://api.example.com/v1/countries?region=europe&limit=10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    path: String,
    query_parameters: Vec<(String, String)>,
}

impl Endpoint {
    /// Creates an endpoint with no query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query_parameters: Vec::new(),
        }
    }

    /// Creates an endpoint with the given query parameters, kept in order.
    pub fn with_query_parameters<K, V>(
        path: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: path.into(),
            query_parameters: parameters
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Returns a copy of this endpoint with one more query parameter appended.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.push((name.into(), value.into()));
        self
    }

    /// The endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query parameters, in insertion order.
    pub fn query_parameters(&self) -> &[(String, String)] {
        &self.query_parameters
    }

    /// Builds the absolute URL `<scheme>://<host><path>[?<query>]`.
    ///
    /// The path must be empty or start with `/`. Characters such as `?` or
    /// `#` inside the path are percent-encoded rather than starting a query
    /// or fragment. The query is only attached when there is at least one
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidRequest`] if no well-formed URL can be
    /// produced from the inputs.
    pub fn url(&self, scheme: &UrlScheme, host: &UrlHost) -> Result<Url, NetworkError> {
        // A path that follows an authority has to be absolute.
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(NetworkError::InvalidRequest);
        }

        let mut url = Url::parse(&format!("{}://{}", scheme, host))
            .map_err(|_| NetworkError::InvalidRequest)?;

        if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
            return Err(NetworkError::InvalidRequest);
        }

        // `url` has just been parsed from nothing but scheme and host.
        if url.path() != "/" && !url.path().is_empty() {
            return Err(NetworkError::InvalidRequest);
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(NetworkError::InvalidRequest);
        }

        url.set_path(&self.path);

        if !self.query_parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query_parameters
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );
        }

        Ok(url)
    }
}
