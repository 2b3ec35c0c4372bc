use reqwest::Client;
use reqwest::redirect::Policy;

use super::options::EffectiveOptions;
use crate::config::{ConnectorConfig, ProxyConfig};
use crate::error::{Error, Result};

/// Redirects are followed by default, bounded at 10 hops, matching the
/// transport defaults the original option names were defined against.
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Connector bound to one base endpoint.
///
/// Holds the immutable configuration and a base `reqwest::Client` built from
/// the config-level transport defaults. Calls that override a
/// transport-level key (proxy, redirect policy, cookie policy) get a
/// dedicated client for that call; everything else reuses the base client,
/// so concurrent calls share connections and need no coordination.
#[derive(Debug, Clone)]
pub struct Connector {
    client: Client,
    config: ConnectorConfig,
}

impl Connector {
    /// Creates a connector from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the endpoint is empty, the
    /// proxy URL is invalid, or the HTTP client cannot be built.
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;

        let client = build_transport(
            &config.user_agent,
            config.connect_timeout,
            config.proxy.as_ref(),
            redirect_policy(
                config.follow_redirect,
                config.follow_all_redirects,
                config.max_redirects,
            ),
            config.cookies.unwrap_or(true),
        )
        .map_err(Error::configuration)?;

        Ok(Self { client, config })
    }

    /// Returns a reference to the stored configuration.
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Selects the client for one call: the shared base client, or a
    /// dedicated one when the call overrode a key that is fixed at client
    /// build time.
    pub(crate) fn client_for(&self, effective: &EffectiveOptions) -> Result<Client> {
        if !effective.transport_override {
            return Ok(self.client.clone());
        }

        build_transport(
            &self.config.user_agent,
            self.config.connect_timeout,
            effective.proxy.as_ref(),
            redirect_policy(
                effective.follow_redirect,
                effective.follow_all_redirects,
                effective.max_redirects,
            ),
            effective.cookies.unwrap_or(true),
        )
        .map_err(Error::invalid_options)
    }
}

/// Resolves the redirect options into a reqwest policy. `follow_redirect`
/// defaults to true; `follow_all_redirects` keeps redirects enabled even
/// when `follow_redirect` was explicitly disabled, since it asks for MORE
/// following, not less. Per-verb 3xx behavior beyond that is the
/// transport's concern.
fn redirect_policy(
    follow_redirect: Option<bool>,
    follow_all_redirects: Option<bool>,
    max_redirects: Option<u32>,
) -> Policy {
    let enabled = follow_redirect.unwrap_or(true) || follow_all_redirects.unwrap_or(false);
    if enabled {
        Policy::limited(max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS) as usize)
    } else {
        Policy::none()
    }
}

/// Builds a `reqwest::Client` from resolved transport settings. Errors are
/// returned as plain messages so callers can wrap them in the error kind
/// appropriate to their phase (construction vs. per-call override).
fn build_transport(
    user_agent: &str,
    connect_timeout: std::time::Duration,
    proxy: Option<&ProxyConfig>,
    redirect: Policy,
    cookies: bool,
) -> std::result::Result<Client, String> {
    let mut builder = Client::builder()
        .connect_timeout(connect_timeout)
        .gzip(true)
        .redirect(redirect)
        .cookie_store(cookies)
        .user_agent(user_agent);

    if let Some(proxy_config) = proxy {
        let mut proxy = reqwest::Proxy::all(&proxy_config.url)
            .map_err(|e| format!("Invalid proxy URL: {e}"))?;

        if let (Some(username), Some(password)) =
            (&proxy_config.username, &proxy_config.password)
        {
            proxy = proxy.basic_auth(username, password);
        }
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}
