use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Merges two optional header maps: every `primary` key is kept with its
/// value, `secondary` keys are added only where absent. Key comparison is
/// exact-string; case-insensitive lookup is a response-side concern handled
/// by [`find_header`]. Neither input is mutated.
pub(crate) fn merge_headers(
    primary: Option<&HashMap<String, String>>,
    secondary: Option<&HashMap<String, String>>,
) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    if let Some(secondary) = secondary {
        for (name, value) in secondary {
            merged.insert(name.clone(), value.clone());
        }
    }
    if let Some(primary) = primary {
        for (name, value) in primary {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Looks up a header value by name, scanning names case-insensitively in
/// whatever case they were stored.
pub(crate) fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Inserts a header, replacing any case-variant of the same name first so
/// the result stays deterministic once converted to a `HeaderMap`.
pub(crate) fn insert_header(headers: &mut HashMap<String, String>, name: &str, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

/// Converts a plain header map into a typed `HeaderMap`.
///
/// # Errors
///
/// Returns [`Error::InvalidOptions`] for names or values that are not valid
/// HTTP; this aborts the request before anything is sent.
pub(crate) fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::invalid_options(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_options(format!("Invalid value for header '{name}': {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Copies a typed `HeaderMap` into a plain string map, verbatim.
pub(crate) fn from_header_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(headers.len());
    for (name, value) in headers {
        map.insert(
            name.as_str().to_string(),
            value.to_str().unwrap_or("").to_string(),
        );
    }
    map
}
