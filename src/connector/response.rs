//! Response normalization and the buffered/stream result split.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::headers::{find_header, from_header_map};
use crate::config::BodyEncoding;
use crate::error::{Error, Result};

/// Result of one dispatched request.
///
/// The two modes are distinct variants so a live stream handle can never be
/// mistaken for a fully buffered response.
#[derive(Debug)]
pub enum Reply {
    /// Response fully read and normalized before being returned.
    Buffered(HttpResponse),
    /// Live handle returned before the body was read.
    Stream(StreamHandle),
}

impl Reply {
    /// Returns the buffered response, if this is buffered mode.
    pub fn into_buffered(self) -> Option<HttpResponse> {
        match self {
            Reply::Buffered(response) => Some(response),
            Reply::Stream(_) => None,
        }
    }

    /// Returns the stream handle, if this is streaming mode.
    pub fn into_stream(self) -> Option<StreamHandle> {
        match self {
            Reply::Stream(handle) => Some(handle),
            Reply::Buffered(_) => None,
        }
    }
}

/// Normalized response: status and headers copied verbatim from the
/// transport, body conditionally JSON-decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code, passed through unchanged — non-2xx is not an error.
    pub status: u16,
    /// Response headers, names in whatever case the transport returned them.
    pub headers: HashMap<String, String>,
    /// Decoded or raw body.
    pub body: ResponseBody,
}

/// Response body in one of three shapes, selected by the `Content-Type`
/// sniff and the configured encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON (the content type contained "json" and parsing
    /// succeeded).
    Json(Value),
    /// Raw body as UTF-8 text.
    Text(String),
    /// Raw body bytes (binary encoding configured).
    Bytes(Bytes),
}

impl ResponseBody {
    /// Returns the parsed JSON value, if the body was decoded.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw text body, if the body is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the raw bytes, if the body is binary.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseBody::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Live response handle for streaming mode.
///
/// Exposes the transport's raw status and header metadata immediately; the
/// body lifecycle (chunks, errors, end) is entirely the stream's concern.
/// Nothing is JSON-decoded in this mode.
#[derive(Debug)]
pub struct StreamHandle {
    inner: reqwest::Response,
}

impl StreamHandle {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Raw status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Raw response headers.
    pub fn headers(&self) -> &reqwest::header::HeaderMap {
        self.inner.headers()
    }

    /// Consumes the handle, yielding the body as a byte stream.
    pub fn bytes_stream(self) -> impl futures_util::Stream<Item = reqwest::Result<Bytes>> {
        self.inner.bytes_stream()
    }

    /// Consumes the handle, yielding the underlying transport response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

/// Reads the full body and normalizes the transport response.
#[instrument(
    name = "connector_normalize",
    skip(response, encoding),
    fields(status = tracing::field::Empty)
)]
pub(crate) async fn normalize(
    response: reqwest::Response,
    encoding: BodyEncoding,
) -> Result<HttpResponse> {
    let status = response.status();
    let headers = from_header_map(response.headers());

    tracing::Span::current().record("status", status.as_u16());

    let body_bytes = response.bytes().await.map_err(|e| {
        error!(
            error = %e,
            "Failed to read response body"
        );
        Error::network(format!("Failed to read response body: {e}"))
    })?;

    const BODY_PREVIEW_SIZE: usize = 200;
    let preview_len = body_bytes.len().min(BODY_PREVIEW_SIZE);
    let body_preview = String::from_utf8_lossy(&body_bytes[..preview_len]);
    debug!(
        status = %status,
        body_length = body_bytes.len(),
        body_preview = %body_preview,
        "HTTP response received"
    );

    let body = decode_body(&headers, body_bytes, encoding);

    Ok(HttpResponse {
        status: status.as_u16(),
        headers,
        body,
    })
}

/// Decodes the body per the `Content-Type` sniff: a content type containing
/// "json" (case-insensitive, header name looked up case-insensitively) gets
/// a JSON parse attempt, silently falling back to the raw body on failure.
/// Everything else is returned raw, text or bytes per the encoding.
pub(crate) fn decode_body(
    headers: &HashMap<String, String>,
    bytes: Bytes,
    encoding: BodyEncoding,
) -> ResponseBody {
    if let Some(content_type) = find_header(headers, "content-type") {
        if content_type.to_ascii_lowercase().contains("json") {
            if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
                return ResponseBody::Json(value);
            }
        }
    }

    match encoding {
        BodyEncoding::Utf8 => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
        BodyEncoding::Binary => ResponseBody::Bytes(bytes),
    }
}
