//! Maps a raw backend answer onto success or a typed failure.

use serde_json::{Value, json};

use super::transport::RawResponse;
use crate::error::{Error, ErrorKind, Result};

/// Classifies a response that the retry loop decided not to retry.
///
/// Failures keep the exact status code and the body as details.
pub fn classify_response(response: &RawResponse) -> Result<Value> {
    let status = response.status;
    let failure = |kind: ErrorKind, message: &str| -> Result<Value> {
        Err(Error::new(kind, message)
            .with_status(status)
            .with_details(body_details(&response.body)))
    };

    match status {
        401 => failure(
            ErrorKind::Authentication,
            "Invalid or inactive access_token",
        ),
        404 => failure(
            ErrorKind::TransactionNotFound,
            "No transaction found for the given cheque_id",
        ),
        400 => failure(ErrorKind::InvalidRequest, "Request rejected as invalid"),
        s if s >= 500 => failure(ErrorKind::Server, "Server error"),
        // Only reached when a caller classifies a 429 directly; the retry loop
        // turns an exhausted 429 into `RateLimitExhausted` instead.
        429 => failure(
            ErrorKind::Service,
            "Rate-limited this request (429 Too Many Requests)",
        ),
        _ => serde_json::from_str(&response.body).map_err(|_| {
            Error::invalid_request("Invalid JSON response")
                .with_status(status)
                .with_details(Some(json!({ "raw": response.body })))
        }),
    }
}

/// The body as JSON when it parses, the raw text otherwise, nothing when empty.
pub(crate) fn body_details(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}
