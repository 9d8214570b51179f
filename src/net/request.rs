//! Request option merging and error-body parsing.
//!
//! Kept free of I/O so header precedence and message extraction can be
//! tested without a server.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use serde_json::Value;

/// Per-call options a flow can pass to the request helper.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Headers merged over the defaults. Keys set here replace the default
    /// value for that key; keys not set keep the default.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl RequestOptions {
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self { headers: HeaderMap::new(), body: Some(body) }
    }
}

/// `Content-Type: application/json`, plus `Authorization: Bearer <token>`
/// when a token is present.
///
/// # Errors
///
/// Returns an error if the token contains characters not allowed in a header.
pub fn default_headers(token: Option<&str>) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Overlay `caller` onto `defaults`, key by key.
#[must_use]
pub fn merge_headers(mut defaults: HeaderMap, caller: &HeaderMap) -> HeaderMap {
    for key in caller.keys() {
        defaults.remove(key);
        for value in caller.get_all(key) {
            defaults.append(key.clone(), value.clone());
        }
    }
    defaults
}

/// Fallback text when the backend gives no usable message.
#[must_use]
pub fn generic_failure_message(status: u16) -> String {
    format!("Request failed (HTTP {status}).")
}

/// Pull a human-readable message out of an error response body.
///
/// Looks at `error`, then `message`, then `msg`; anything else falls back to
/// [`generic_failure_message`].
#[must_use]
pub fn error_message_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message", "msg"].iter().find_map(|key| {
                json.get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| generic_failure_message(status))
}
