//! Typed failures returned by every client operation.

use serde_json::Value;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, independent of the message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or rejected merchant credential (local check or HTTP 401).
    Authentication,
    /// The backend has no transaction for the given cheque id (HTTP 404).
    TransactionNotFound,
    /// Malformed local input, HTTP 400, or an undecodable response body.
    InvalidRequest,
    /// No response was received at all.
    Network,
    /// HTTP 5xx.
    Server,
    /// Every attempt was answered with HTTP 429.
    RateLimitExhausted,
    /// The response was accepted but lacked the expected payload.
    Service,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "authentication failure",
            ErrorKind::TransactionNotFound => "transaction not found",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::Network => "network failure",
            ErrorKind::Server => "server failure",
            ErrorKind::RateLimitExhausted => "rate limit exhausted",
            ErrorKind::Service => "service failure",
        };
        f.write_str(name)
    }
}

/// A failed client operation.
///
/// Carries the HTTP status and the response body (when one was
/// received) so callers can inspect what the backend actually said.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}{}", status_suffix(.status_code))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status_code: Option<u16>,
    details: Option<Value>,
}

fn status_suffix(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!(" (status={})", code),
        None => String::new(),
    }
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    pub fn rate_limit_exhausted() -> Self {
        Self::new(
            ErrorKind::RateLimitExhausted,
            "Max retry attempts reached (429)",
        )
        .with_status(429)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}
