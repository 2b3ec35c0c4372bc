//! Per-call options and the option-merging core.
//!
//! [`EffectiveOptions::merge`] implements the precedence rule: for each
//! pass-through key, the per-call value wins if present, else the
//! configuration default applies, else the key is absent from the merged set.
//! Headers merge key-by-key instead of whole-map override.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::headers::merge_headers;
use crate::config::{AwsConfig, BasicAuth, BodyEncoding, ConnectorConfig, OAuthConfig, ProxyConfig};
use crate::error::{Error, Result};

/// Request body for POST/PUT/PATCH-style calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestBody {
    /// JSON value, serialized and sent with `application/json`.
    Json(Value),
    /// Plain text, sent as-is.
    Text(String),
    /// Raw bytes, sent as-is.
    Bytes(Vec<u8>),
}

/// Per-invocation request options.
///
/// Every field is optional; unset fields fall back to the
/// [`ConnectorConfig`] defaults during the merge. The struct is consumed by
/// the call and never retained.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// HTTP method, case-insensitive; normalized to uppercase before use.
    /// Required for [`crate::Connector::exec`]; the verb shortcuts set it.
    pub method: Option<String>,
    /// Resource path appended verbatim to the configured endpoint.
    pub path: Option<String>,
    /// Per-call headers, merged over the configured defaults key-by-key.
    pub headers: Option<HashMap<String, String>>,
    /// When `true`, the live response handle is returned before the body is
    /// read and no normalization happens.
    pub stream: bool,
    /// Query-string pairs appended to the URL.
    pub qs: Option<Vec<(String, String)>>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Whether to follow HTTP 3xx redirects.
    pub follow_redirect: Option<bool>,
    /// Whether non-GET 3xx responses also count as redirects to follow.
    pub follow_all_redirects: Option<bool>,
    /// Maximum number of redirects to follow.
    pub max_redirects: Option<u32>,
    /// How a non-JSON response body is returned.
    pub encoding: Option<BodyEncoding>,
    /// Time budget for the buffered round-trip.
    pub timeout: Option<Duration>,
    /// HTTP proxy for this call.
    pub proxy: Option<ProxyConfig>,
    /// Whether cookies are remembered for this call.
    pub cookies: Option<bool>,
    /// HTTP basic authentication credentials.
    pub auth: Option<BasicAuth>,
    /// OAuth 1.0 signing descriptor.
    pub oauth: Option<OAuthConfig>,
    /// AWS signing descriptor.
    pub aws: Option<AwsConfig>,
}

impl CallOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method (any verb token, case-insensitive).
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the resource path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a per-call header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Appends a query-string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qs
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Sets a JSON request body.
    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Sets a plain-text request body.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }

    /// Sets a raw-bytes request body.
    pub fn bytes(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes(bytes));
        self
    }

    /// Requests streaming mode.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Sets the per-call time budget.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets per-call basic-auth credentials.
    pub fn auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// The merged option set actually dispatched to the transport.
///
/// Computed fresh per call; `Option` fields stay `None` when the key was
/// present in neither the call options nor the configuration.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveOptions {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub stream: bool,
    pub qs: Option<Vec<(String, String)>>,
    pub body: Option<RequestBody>,
    pub follow_redirect: Option<bool>,
    pub follow_all_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    pub encoding: Option<BodyEncoding>,
    pub timeout: Option<Duration>,
    pub proxy: Option<ProxyConfig>,
    pub cookies: Option<bool>,
    pub auth: Option<BasicAuth>,
    pub oauth: Option<OAuthConfig>,
    pub aws: Option<AwsConfig>,
    /// Whether the call overrode a transport-level key (proxy, redirects,
    /// cookies) that is fixed at client-build time, forcing a dedicated
    /// client for this call.
    pub transport_override: bool,
}

impl EffectiveOptions {
    /// Merges per-call options over the configuration defaults.
    pub(crate) fn merge(config: &ConnectorConfig, options: CallOptions) -> Result<Self> {
        let method = normalize_method(options.method.as_deref())?;
        let path = options.path.unwrap_or_default();
        let url = format!("{}{}", config.endpoint, path);
        let headers = merge_headers(options.headers.as_ref(), Some(&config.headers));

        let transport_override = options.proxy.is_some()
            || options.follow_redirect.is_some()
            || options.follow_all_redirects.is_some()
            || options.max_redirects.is_some()
            || options.cookies.is_some();

        Ok(Self {
            method,
            url,
            path,
            headers,
            stream: options.stream,
            qs: options.qs.or_else(|| config.qs.clone()),
            body: options.body.or_else(|| config.body.clone()),
            follow_redirect: options.follow_redirect.or(config.follow_redirect),
            follow_all_redirects: options.follow_all_redirects.or(config.follow_all_redirects),
            max_redirects: options.max_redirects.or(config.max_redirects),
            encoding: options.encoding.or(config.encoding),
            timeout: options.timeout.or(config.timeout),
            proxy: options.proxy.or_else(|| config.proxy.clone()),
            cookies: options.cookies.or(config.cookies),
            auth: options.auth.or_else(|| config.auth.clone()),
            oauth: options.oauth.or_else(|| config.oauth.clone()),
            aws: options.aws.or_else(|| config.aws.clone()),
            transport_override,
        })
    }
}

/// Uppercases the method string and validates it as an HTTP token.
/// Defaults to GET when unset — callers that require an explicit method
/// (`exec`) check for presence before reaching this point.
fn normalize_method(method: Option<&str>) -> Result<Method> {
    let raw = method.unwrap_or("GET");
    let upper = raw.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| Error::invalid_options(format!("'{raw}' is not a valid HTTP method token")))
}
