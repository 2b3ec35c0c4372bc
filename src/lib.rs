//! rest-connector
//!
//! A configurable REST endpoint connector: bind a base endpoint and default
//! request options once, then issue requests whose per-call options merge
//! over the stored defaults. Responses are normalized into a
//! `{status, headers, body}` shape with conditional JSON decoding, or handed
//! back as a live stream before the body is read.
//!
//! # Features
//!
//! - **Option merging**: per-call options win key-by-key over configured
//!   defaults; headers merge per key rather than whole-map override
//! - **Normalized responses**: status and headers pass through verbatim,
//!   bodies with a JSON content type are decoded (falling back to the raw
//!   body when parsing fails)
//! - **Streaming mode**: [`Reply::Stream`] exposes the raw status, headers,
//!   and byte stream without buffering
//! - **Request signing**: basic auth, OAuth 1.0 HMAC-SHA1, and S3-style AWS
//!   headers from per-call or configured descriptors
//!
//! # Example
//!
//! ```rust,no_run
//! use rest_connector::{CallOptions, Connector, ConnectorConfig, Reply, ResponseBody};
//!
//! # async fn example() -> rest_connector::Result<()> {
//! let config = ConnectorConfig::new("https://api.example.com")
//!     .header("x-api-key", "secret");
//! let connector = Connector::new(config)?;
//!
//! let reply = connector
//!     .get(CallOptions::new().path("/users").query("page", "1"))
//!     .await?;
//!
//! if let Reply::Buffered(response) = reply {
//!     if let ResponseBody::Json(users) = response.body {
//!         println!("{users}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Global suppressions, justified:
// - module_name_repetitions: common library naming (ConnectorConfig in config)
// - missing_errors_doc: not every Result-returning function documents errors
// - must_use_candidate: not all return values need #[must_use]
// - return_self_not_must_use: builder methods return Self without must_use
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod connector;
pub mod error;
mod sign;

pub use config::{AwsConfig, BasicAuth, BodyEncoding, ConnectorConfig, OAuthConfig, ProxyConfig};
pub use connector::{
    CallOptions, Connector, HttpResponse, Reply, RequestBody, ResponseBody, StreamHandle,
};
pub use error::{Error, Result};
