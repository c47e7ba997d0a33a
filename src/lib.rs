//! # Courier - typed endpoint requests
//!
//! Courier turns structured endpoint definitions into HTTP calls, classifies
//! the outcome into a small closed set of errors, and decodes JSON bodies
//! into your types. Every call can be made three ways, with identical
//! results: `async`/`await`, a single-item stream, or a completion closure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use courier::{Endpoint, HttpMethod, JsonDecoder, NetworkClient, SelfDecodable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewUser {
//!     first_name: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct User {
//!     id: u64,
//!     first_name: String,
//! }
//!
//! impl SelfDecodable for User {
//!     // The API speaks snake_case.
//!     const DECODER: JsonDecoder = JsonDecoder::SNAKE_CASE;
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), courier::NetworkError> {
//!     let client = NetworkClient::builder()
//!         .default_host("api.example.com")
//!         .build()?;
//!
//!     // GET https://api.example.com/users/123
//!     let request = client.request(Endpoint::new("/users/123")).build();
//!     let user: User = client.perform(&request).await?;
//!     println!("User: {}", user.first_name);
//!
//!     // POST https://api.example.com/users?notify=true
//!     let request = client
//!         .request(Endpoint::new("/users").query("notify", "true"))
//!         .method(HttpMethod::Post)
//!         .json_body(&NewUser { first_name: "Alice".to_string() })?
//!         .build();
//!     let created: User = client.perform(&request).await?;
//!     println!("Created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Each failed call yields exactly one [`NetworkError`]:
//!
//! - `InvalidRequest` when the descriptor cannot become a request;
//! - `TransportFailure` when no response arrived (connection, timeout, cancellation);
//! - a status variant (`NotFound`, `ServerError5xx(503)`, ...) for non-2xx responses;
//! - `DecodingError` when the body does not fit the requested type.
//!
//! ```no_run
//! use courier::{Endpoint, NetworkClient, NetworkError};
//!
//! # async fn example() -> Result<(), NetworkError> {
//! # let client = NetworkClient::builder().default_host("api.example.com").build()?;
//! let request = client.request(Endpoint::new("/endpoint")).build();
//! match client.perform::<serde_json::Value>(&request).await {
//!     Ok(value) => println!("Success: {}", value),
//!     Err(NetworkError::Unauthorized) => eprintln!("Log in first"),
//!     Err(e) if e.is_server_error() => eprintln!("Server trouble: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Requests, responses and failures are reported through `tracing`. Install
//! any subscriber to see them; the stream form additionally logs each raw
//! exchange at `debug` level.

mod client;
mod decoder;
mod endpoint;
mod error;
mod request;
mod response;
pub mod transport;

pub use client::{ClientBuilder, NetworkClient, RequestHandle, RequestStream};
pub use decoder::{JsonDecoder, KeyDecodingStrategy, SelfDecodable};
pub use endpoint::{Endpoint, UrlHost, UrlScheme};
pub use error::{NetworkError, Result};
pub use request::{
    CachePolicy, ContentType, HttpMethod, Request, RequestBuilder, RequestTask, DEFAULT_TIMEOUT,
};
pub use response::Response;
pub use transport::{Transport, TransportError};
