//! Error types for endpoint requests.
//!
//! Every failed call produces exactly one [`NetworkError`]. Non-2xx statuses
//! are classified with [`NetworkError::from_status`], failures raised before
//! or during the exchange with [`NetworkError::from_transport_error`].

use crate::transport::TransportError;

/// The error type for endpoint requests.
///
/// The set of variants is closed. Variants carry data only where the
/// original status code or the underlying transport failure is needed to
/// tell two failures apart.
///
/// # Examples
///
/// ```no_run
/// use courier::{Endpoint, NetworkClient, NetworkError};
///
/// #[derive(serde::Deserialize)]
/// struct Country {
///     name: String,
/// }
///
/// impl courier::SelfDecodable for Country {}
///
/// # async fn example() -> Result<(), NetworkError> {
/// let client = NetworkClient::builder()
///     .default_host("api.example.com")
///     .build()?;
///
/// let request = client.request(Endpoint::new("/countries/ca")).build();
///
/// match client.perform::<Country>(&request).await {
///     Ok(country) => println!("Country: {}", country.name),
///     Err(NetworkError::NotFound) => eprintln!("No such country"),
///     Err(NetworkError::TransportFailure(e)) => eprintln!("Could not reach server: {}", e),
///     Err(e) => eprintln!("Request failed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The request could not be built (malformed URL, invalid header, unserializable body).
    #[error("Invalid request")]
    InvalidRequest,

    /// HTTP 400.
    #[error("Bad request")]
    BadRequest,

    /// HTTP 401.
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 403.
    #[error("Forbidden")]
    Forbidden,

    /// HTTP 404.
    #[error("Not found")]
    NotFound,

    /// HTTP 402 or 405–499.
    #[error("Client error {0}")]
    ClientError4xx(u16),

    /// HTTP 500.
    #[error("Internal server error")]
    ServerError,

    /// HTTP 501–599.
    #[error("Server error {0}")]
    ServerError5xx(u16),

    /// The response body could not be decoded into the requested type.
    #[error("Failed to decode response")]
    DecodingError,

    /// No response was received (connection failure, timeout, cancellation).
    #[error("Transport failure: {0}")]
    TransportFailure(TransportError),

    /// Anything that fits no other variant.
    #[error("Unknown error")]
    UnknownError,
}

impl NetworkError {
    /// Maps an HTTP status code to its error.
    ///
    /// Only meaningful for statuses outside `200..300`; codes that are not
    /// 4xx or 5xx map to [`NetworkError::UnknownError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use courier::NetworkError;
    ///
    /// assert_eq!(NetworkError::from_status(404), NetworkError::NotFound);
    /// assert_eq!(NetworkError::from_status(429), NetworkError::ClientError4xx(429));
    /// assert_eq!(NetworkError::from_status(503), NetworkError::ServerError5xx(503));
    /// assert_eq!(NetworkError::from_status(302), NetworkError::UnknownError);
    /// ```
    pub fn from_status(code: u16) -> Self {
        match code {
            400 => NetworkError::BadRequest,
            401 => NetworkError::Unauthorized,
            403 => NetworkError::Forbidden,
            404 => NetworkError::NotFound,
            402 | 405..=499 => NetworkError::ClientError4xx(code),
            500 => NetworkError::ServerError,
            501..=599 => NetworkError::ServerError5xx(code),
            _ => NetworkError::UnknownError,
        }
    }

    /// Maps a failure raised outside of a completed HTTP exchange.
    ///
    /// JSON errors become [`NetworkError::DecodingError`], transport errors
    /// become [`NetworkError::TransportFailure`], a `NetworkError` is returned
    /// unchanged, and anything else is [`NetworkError::UnknownError`].
    pub fn from_transport_error(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        let error = match error.downcast::<NetworkError>() {
            Ok(network) => return *network,
            Err(other) => other,
        };
        let error = match error.downcast::<TransportError>() {
            Ok(transport) => return NetworkError::TransportFailure(*transport),
            Err(other) => other,
        };
        let error = match error.downcast::<reqwest::Error>() {
            Ok(reqwest) => return NetworkError::TransportFailure(TransportError::from(*reqwest)),
            Err(other) => other,
        };
        if error.is::<serde_json::Error>() {
            return NetworkError::DecodingError;
        }
        NetworkError::UnknownError
    }

    /// Returns the HTTP status code this error was classified from, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetworkError::BadRequest => Some(400),
            NetworkError::Unauthorized => Some(401),
            NetworkError::Forbidden => Some(403),
            NetworkError::NotFound => Some(404),
            NetworkError::ClientError4xx(code) => Some(*code),
            NetworkError::ServerError => Some(500),
            NetworkError::ServerError5xx(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` for errors classified from a 4xx status.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_some_and(|code| (400..500).contains(&code))
    }

    /// Returns `true` for errors classified from a 5xx status.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|code| (500..600).contains(&code))
    }
}

impl From<TransportError> for NetworkError {
    fn from(error: TransportError) -> Self {
        NetworkError::TransportFailure(error)
    }
}

/// A specialized `Result` type for endpoint requests.
pub type Result<T> = std::result::Result<T, NetworkError>;
