//! Error types for the connector.
//!
//! All errors after construction are reported through the `Result` returned
//! by the request methods, never panicked. Construction-time problems
//! (`Configuration`) are the only errors raised before a request exists.
//!
//! JSON-decode failures of response bodies are deliberately NOT errors:
//! the raw body is returned instead (see `connector::response`).

use std::borrow::Cow;

use thiserror::Error;

/// Result type alias for all connector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by [`crate::Connector`].
///
/// String payloads use `Cow<'static, str>` so static messages allocate
/// nothing; use the constructor helpers (`Error::network(...)`, etc.) rather
/// than building variants directly.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration at construction time (empty endpoint, bad proxy
    /// URL, transport build failure). Raised synchronously by
    /// [`crate::Connector::new`].
    #[error("Configuration error: {0}")]
    Configuration(Cow<'static, str>),

    /// `exec` was called without a usable `method` option.
    #[error("Missing method: {0}")]
    MissingMethod(Cow<'static, str>),

    /// Per-call options that cannot be turned into a request: an invalid
    /// method token, header names/values that are not valid HTTP, or a
    /// per-call transport override that fails to build.
    #[error("Invalid options: {0}")]
    InvalidOptions(Cow<'static, str>),

    /// Transport-level failure, forwarded from the HTTP client with the
    /// source message preserved.
    #[error("Network error: {0}")]
    Network(Cow<'static, str>),

    /// The request exceeded its time budget.
    #[error("Timeout: {0}")]
    Timeout(Cow<'static, str>),
}

impl Error {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a missing-method error.
    pub fn missing_method(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::MissingMethod(msg.into())
    }

    /// Creates an invalid-options error.
    pub fn invalid_options(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Returns `true` if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this is a transport-level error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timed out: {err}"))
        } else {
            Self::network(format!("Request failed: {err}"))
        }
    }
}
