//! Request headers expected by the TsPay edge.
//!
//! The backend sits behind a bot-protection layer that rejects requests which
//! do not look like they come from a browser, so these values are part of the
//! wire contract. Update them here without touching retry or classification.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/128.0.0.0 Safari/537.36";

pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", BROWSER_USER_AGENT),
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/json"),
    ("connection", "keep-alive"),
    ("origin", "https://tspay.uz"),
    ("referer", "https://tspay.uz/"),
];

/// Builds the full header set for one request, credential included.
///
/// The authorization value is marked sensitive so it never shows up in
/// `Debug` output of the request.
pub fn request_headers(credential: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(BROWSER_HEADERS.len() + 1);
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", credential)).map_err(|_| {
        Error::authentication("Access token contains characters not allowed in a header")
    })?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);

    Ok(headers)
}
