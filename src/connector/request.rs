use reqwest::Client;
use tracing::{debug, error, instrument, warn};

use super::builder::Connector;
use super::headers::{find_header, insert_header, to_header_map};
use super::options::{CallOptions, EffectiveOptions, RequestBody};
use super::response::{Reply, StreamHandle, normalize};
use crate::error::{Error, Result};
use crate::sign;

impl Connector {
    /// Executes a request with an explicitly supplied method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMethod`] when `options.method` is unset or
    /// empty; the method string is otherwise uppercased before use. The verb
    /// shortcuts skip this check because they set the method themselves.
    #[instrument(name = "connector_exec", skip(self, options), fields(endpoint = %self.config().endpoint))]
    pub async fn exec(&self, options: CallOptions) -> Result<Reply> {
        match options.method.as_deref() {
            Some(method) if !method.is_empty() => {}
            _ => {
                return Err(Error::missing_method(
                    "'method' option is missing or empty",
                ));
            }
        }
        self.execute(options).await
    }

    /// Executes a GET request, overriding any caller-supplied method.
    pub async fn get(&self, mut options: CallOptions) -> Result<Reply> {
        options.method = Some("GET".to_string());
        self.execute(options).await
    }

    /// Executes a POST request, overriding any caller-supplied method.
    pub async fn post(&self, mut options: CallOptions) -> Result<Reply> {
        options.method = Some("POST".to_string());
        self.execute(options).await
    }

    /// Executes a PUT request, overriding any caller-supplied method.
    pub async fn put(&self, mut options: CallOptions) -> Result<Reply> {
        options.method = Some("PUT".to_string());
        self.execute(options).await
    }

    /// Executes a DELETE request, overriding any caller-supplied method.
    pub async fn delete(&self, mut options: CallOptions) -> Result<Reply> {
        options.method = Some("DELETE".to_string());
        self.execute(options).await
    }

    /// Internal execution path: merge, sign, dispatch, normalize.
    #[instrument(
        name = "connector_fetch",
        skip(self, options),
        fields(
            method = tracing::field::Empty,
            url = tracing::field::Empty,
            stream = tracing::field::Empty,
        )
    )]
    async fn execute(&self, options: CallOptions) -> Result<Reply> {
        let effective = EffectiveOptions::merge(self.config(), options)?;

        let span = tracing::Span::current();
        span.record("method", effective.method.as_str());
        span.record("url", effective.url.as_str());
        span.record("stream", effective.stream);

        let client = self.client_for(&effective)?;
        let request = build_request(&client, &effective)?;

        let url = effective.url.clone();
        let timeout = effective.timeout;

        if effective.stream {
            // Streaming mode: hand the live handle back as soon as the
            // transport produces it. No body read, no normalization; the
            // time budget only bounds request initiation.
            let response = with_deadline(timeout, &url, async {
                request.send().await.map_err(|e| {
                    error!(error = %e, "HTTP request send failed");
                    Error::from(e)
                })
            })
            .await?;
            debug!(status = response.status().as_u16(), "Streaming response handed back before body read");
            return Ok(Reply::Stream(StreamHandle::new(response)));
        }

        let encoding = effective.encoding.unwrap_or_default();
        let response = with_deadline(timeout, &url, async {
            let response = request.send().await.map_err(|e| {
                error!(error = %e, "HTTP request send failed");
                Error::from(e)
            })?;
            normalize(response, encoding).await
        })
        .await?;

        Ok(Reply::Buffered(response))
    }
}

/// Bounds `operation` by the effective timeout, when one is set. The
/// elapsed case names the URL and the budget, matching the transport-level
/// timeout message shape.
async fn with_deadline<T>(
    timeout: Option<std::time::Duration>,
    url: &str,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout {
        None => operation.await,
        Some(budget) => match tokio::time::timeout(budget, operation).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    url = %url,
                    timeout_ms = %budget.as_millis(),
                    "HTTP request timed out"
                );
                Err(Error::timeout(format!(
                    "Request to {} timed out after {}ms",
                    url,
                    budget.as_millis()
                )))
            }
        },
    }
}

/// Builds the transport request from the merged options: signing headers,
/// typed header conversion, query string, body, and basic auth (which takes
/// precedence over the signed `Authorization` values).
fn build_request(client: &Client, effective: &EffectiveOptions) -> Result<reqwest::RequestBuilder> {
    let mut headers = effective.headers.clone();

    if let Some(aws) = &effective.aws {
        let date = sign::http_date();
        let content_type = find_header(&headers, "content-type").map(str::to_owned);
        let authorization = sign::aws_authorization(
            aws,
            effective.method.as_str(),
            &effective.path,
            content_type.as_deref(),
            &date,
        );
        insert_header(&mut headers, "date", date);
        insert_header(&mut headers, "authorization", authorization);
    }

    if let Some(oauth) = &effective.oauth {
        let qs: &[(String, String)] = effective.qs.as_deref().unwrap_or(&[]);
        let authorization =
            sign::oauth1_authorization(oauth, effective.method.as_str(), &effective.url, qs);
        insert_header(&mut headers, "authorization", authorization);
    }

    let header_map = to_header_map(&headers)?;
    let mut request = client
        .request(effective.method.clone(), &effective.url)
        .headers(header_map);

    if let Some(qs) = &effective.qs {
        request = request.query(qs);
    }

    if let Some(body) = &effective.body {
        request = match body {
            RequestBody::Json(value) => request.json(value),
            RequestBody::Text(text) => request.body(text.clone()),
            RequestBody::Bytes(bytes) => request.body(bytes.clone()),
        };
    }

    if let Some(auth) = &effective.auth {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }

    // In buffered mode the transport also enforces the budget end-to-end;
    // a stream's body lifetime must not be bounded by it.
    if !effective.stream {
        if let Some(timeout) = effective.timeout {
            request = request.timeout(timeout);
        }
    }

    Ok(request)
}
