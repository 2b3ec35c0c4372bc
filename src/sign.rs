//! Request signing for the `oauth` and `aws` pass-through descriptors.
//!
//! Produces `Authorization` header values:
//! - OAuth 1.0 HMAC-SHA1 signatures (RFC 5849) for [`OAuthConfig`]
//! - S3-style `AWS key:signature` headers for [`AwsConfig`]
//!
//! Signing happens over the merged effective options, before dispatch, so
//! per-call overrides of the descriptors sign the request they belong to.

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::config::{AwsConfig, OAuthConfig};

/// Computes an HMAC-SHA1 signature.
///
/// # Panics
///
/// Never panics: HMAC accepts keys of any length, so `new_from_slice`
/// cannot fail.
fn hmac_sha1(data: &[u8], secret: &[u8]) -> Vec<u8> {
    type HmacSha1 = Hmac<Sha1>;
    let mut mac = HmacSha1::new_from_slice(secret)
        .expect("HMAC-SHA1 accepts keys of any length; this is an infallible operation");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Percent-encodes per RFC 3986 (unreserved characters pass through).
fn pct(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Current time formatted as an HTTP date, for the `date` header that AWS
/// signing covers.
pub(crate) fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builds an OAuth 1.0 `Authorization` header value for the given request.
///
/// `url` must be the request URL without a query string; query parameters go
/// through `qs` so they participate in the signature base string.
pub(crate) fn oauth1_authorization(
    oauth: &OAuthConfig,
    method: &str,
    url: &str,
    qs: &[(String, String)],
) -> String {
    let nonce = nonce();
    let timestamp = Utc::now().timestamp();
    oauth1_authorization_at(oauth, method, url, qs, &nonce, timestamp)
}

/// Deterministic form of [`oauth1_authorization`] with the nonce and
/// timestamp supplied by the caller.
fn oauth1_authorization_at(
    oauth: &OAuthConfig,
    method: &str,
    url: &str,
    qs: &[(String, String)],
    nonce: &str,
    timestamp: i64,
) -> String {
    let timestamp = timestamp.to_string();
    let mut protocol_params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", oauth.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_version", "1.0"),
    ];
    if let Some(token) = &oauth.token {
        protocol_params.push(("oauth_token", token.as_str()));
    }

    // Signature base string covers protocol params and query params together,
    // percent-encoded and sorted by encoded name then value.
    let mut encoded: Vec<(String, String)> = protocol_params
        .iter()
        .map(|(k, v)| (pct(k), pct(v)))
        .chain(qs.iter().map(|(k, v)| (pct(k), pct(v))))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!("{}&{}&{}", method, pct(url), pct(&param_string));
    let key = format!(
        "{}&{}",
        pct(&oauth.consumer_secret),
        pct(oauth.token_secret.as_deref().unwrap_or(""))
    );
    let signature = general_purpose::STANDARD.encode(hmac_sha1(base.as_bytes(), key.as_bytes()));

    let mut header_params: Vec<(String, String)> = protocol_params
        .iter()
        .map(|(k, v)| ((*k).to_string(), pct(v)))
        .collect();
    header_params.push(("oauth_signature".to_string(), pct(&signature)));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

/// Builds the S3-style string-to-sign the `aws` descriptor signs.
///
/// Layout: `METHOD \n content-md5 \n content-type \n date \n resource`, where
/// the canonical resource is the bucket (when configured) followed by the
/// request path.
fn aws_string_to_sign(
    aws: &AwsConfig,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    date: &str,
) -> String {
    let resource = match &aws.bucket {
        Some(bucket) => format!("/{bucket}{path}"),
        None if path.is_empty() => "/".to_string(),
        None => path.to_string(),
    };
    let content_type = content_type.unwrap_or("");
    format!("{method}\n\n{content_type}\n{date}\n{resource}")
}

/// Builds an `AWS key:signature` `Authorization` header value.
pub(crate) fn aws_authorization(
    aws: &AwsConfig,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    date: &str,
) -> String {
    let string_to_sign = aws_string_to_sign(aws, method, path, content_type, date);
    let signature =
        general_purpose::STANDARD.encode(hmac_sha1(string_to_sign.as_bytes(), aws.secret.as_bytes()));
    format!("AWS {}:{}", aws.key, signature)
}

/// Random hex nonce for OAuth signatures.
fn nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
