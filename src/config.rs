//! Connector configuration types.
//!
//! [`ConnectorConfig`] binds the base endpoint, default headers, and the
//! default values of the pass-through request options. The pass-through keys
//! are a closed set of named, typed optional fields — a key that is not a
//! field here simply cannot be expressed, so typos do not get silently
//! dropped the way they would with a string-keyed option bag.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::connector::options::RequestBody;
use crate::error::{Error, Result};

/// Base configuration for a [`crate::Connector`].
///
/// `endpoint` is required and must be non-empty; everything else is an
/// optional default that per-call options may override key-by-key. The
/// configuration is immutable for the connector's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Base URL every request path is appended to. Required, non-empty.
    pub endpoint: String,
    /// Default headers, merged under per-call headers key-by-key.
    pub headers: HashMap<String, String>,
    /// Default query-string pairs appended to the request URL.
    pub qs: Option<Vec<(String, String)>>,
    /// Default request body.
    pub body: Option<RequestBody>,
    /// Whether to follow HTTP 3xx redirects. Defaults to `true` when unset.
    pub follow_redirect: Option<bool>,
    /// Whether non-GET 3xx responses also count as redirects to follow.
    pub follow_all_redirects: Option<bool>,
    /// Maximum number of redirects to follow. Defaults to 10 when unset.
    pub max_redirects: Option<u32>,
    /// How non-JSON response bodies are returned. Defaults to UTF-8 text.
    pub encoding: Option<BodyEncoding>,
    /// Time budget for a whole buffered round-trip.
    pub timeout: Option<Duration>,
    /// HTTP proxy for outgoing requests.
    pub proxy: Option<ProxyConfig>,
    /// Whether cookies are remembered across requests. Defaults to `true`
    /// when unset.
    pub cookies: Option<bool>,
    /// HTTP basic authentication credentials.
    pub auth: Option<BasicAuth>,
    /// OAuth 1.0 HMAC-SHA1 signing descriptor.
    pub oauth: Option<OAuthConfig>,
    /// AWS S3-style signing descriptor.
    pub aws: Option<AwsConfig>,
    /// User-Agent header value set on the underlying client.
    pub user_agent: String,
    /// TCP connection timeout for the underlying client.
    pub connect_timeout: Duration,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            headers: HashMap::new(),
            qs: None,
            body: None,
            follow_redirect: None,
            follow_all_redirects: None,
            max_redirects: None,
            encoding: None,
            timeout: None,
            proxy: None,
            cookies: None,
            auth: None,
            oauth: None,
            aws: None,
            user_agent: concat!("rest-connector/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectorConfig {
    /// Creates a configuration bound to `endpoint` with all defaults unset.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Adds a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Appends a default query-string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qs
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Sets the default round-trip time budget.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the default proxy.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets default basic-auth credentials.
    pub fn auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the default OAuth signing descriptor.
    pub fn oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Sets the default AWS signing descriptor.
    pub fn aws(mut self, aws: AwsConfig) -> Self {
        self.aws = Some(aws);
        self
    }

    /// Sets whether cookies are remembered across requests.
    pub fn cookies(mut self, enabled: bool) -> Self {
        self.cookies = Some(enabled);
        self
    }

    /// Sets how non-JSON response bodies are returned.
    pub fn encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Sets whether redirects are followed, and how many at most.
    pub fn redirects(mut self, follow: bool, max: u32) -> Self {
        self.follow_redirect = Some(follow);
        self.max_redirects = Some(max);
        self
    }

    /// Overrides the User-Agent header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `endpoint` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::configuration("'endpoint' is missing or empty"));
        }
        Ok(())
    }
}

/// How a non-JSON response body is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyEncoding {
    /// Decode the body as UTF-8 text (lossy).
    #[default]
    Utf8,
    /// Return the body as raw bytes.
    Binary,
}

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "http://127.0.0.1:8080").
    pub url: String,
    /// Optional username for proxy authentication.
    pub username: Option<String>,
    /// Optional password for proxy authentication.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Creates a proxy configuration with just a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Sets credentials for the proxy.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// HTTP basic authentication credentials, sent eagerly with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl BasicAuth {
    /// Creates basic-auth credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Descriptor for OAuth 1.0 HMAC-SHA1 request signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Consumer key.
    pub consumer_key: String,
    /// Consumer secret.
    pub consumer_secret: String,
    /// Access token, when a token-authorized request is being made.
    pub token: Option<String>,
    /// Access token secret.
    pub token_secret: Option<String>,
}

impl OAuthConfig {
    /// Creates a descriptor with consumer credentials only.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
            token_secret: None,
        }
    }

    /// Sets the access token and its secret.
    pub fn with_token(mut self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(token_secret.into());
        self
    }
}

/// Descriptor for AWS S3-style request signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    /// Bucket name, unless the bucket is already part of the request path.
    pub bucket: Option<String>,
}

impl AwsConfig {
    /// Creates a descriptor from an access key pair.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            bucket: None,
        }
    }

    /// Sets the bucket the canonical resource is prefixed with.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_endpoint() {
        let config = ConnectorConfig::new("");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn validate_accepts_plain_endpoint() {
        let config = ConnectorConfig::new("http://localhost:9615");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_populate_defaults() {
        let config = ConnectorConfig::new("https://api.example.com")
            .header("x-api-key", "k")
            .query("v", "2")
            .timeout(Duration::from_secs(5))
            .cookies(false);

        assert_eq!(config.headers.get("x-api-key").map(String::as_str), Some("k"));
        assert_eq!(config.qs.as_deref(), Some(&[("v".to_string(), "2".to_string())][..]));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.cookies, Some(false));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = ConnectorConfig::new("https://api.example.com")
            .auth(BasicAuth::new("user", "pass"))
            .aws(AwsConfig::new("AKID", "secret").with_bucket("logs"));

        let json = serde_json::to_string(&config).unwrap();
        let back: ConnectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.endpoint, config.endpoint);
        assert_eq!(back.auth, config.auth);
        assert_eq!(back.aws, config.aws);
    }
}
