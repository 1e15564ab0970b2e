//! One blocking request/response exchange with the backend.

use log::debug;
use reqwest::{Method, Url};
use reqwest::header::HeaderMap;
use reqwest::blocking::Client;
use serde_json::Value;

use super::headers::request_headers;
use crate::error::{Error, Result};

/// A request ready to be sent.
///
/// Headers are built up front, so a malformed credential is rejected before
/// any I/O. The authorization header is marked sensitive and never printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: Url, credential: &str) -> Result<Self> {
        Ok(Self {
            method: Method::GET,
            url,
            headers: request_headers(credential)?,
            body: None,
        })
    }

    pub fn post(url: Url, credential: &str, body: Value) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            url,
            headers: request_headers(credential)?,
            body: Some(body),
        })
    }
}

/// Status and body text of whatever the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// No response was obtained: connection refused, DNS failure, timeout, or the
/// body could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError(error.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a blocking reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client, e.g. one with custom timeouts.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        debug!("{} {}...", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("{} {} -> {}", request.method, request.url, status);

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn parse_url(raw: String) -> Url {
        Url::parse(&raw).unwrap()
    }

    #[test]
    fn test_send_get_with_headers() {
        let mut server = mockito::Server::new();
        let url = server.url();

        let mock = server
            .mock("GET", "/transactions/abc123/")
            .match_header("authorization", "Bearer merchant-token")
            .match_header("origin", "https://tspay.uz")
            .match_header("referer", "https://tspay.uz/")
            .match_header("accept-language", "en-US,en;q=0.9")
            .match_header("user-agent", Matcher::Regex("Mozilla/5.0".to_string()))
            .with_status(200)
            .with_body(r#"{"status": "paid"}"#)
            .create();

        let transport = HttpTransport::new().unwrap();
        let request =
            ApiRequest::get(parse_url(format!("{}/transactions/abc123/", url)), "merchant-token")
                .unwrap();
        let response = transport.send(&request).unwrap();

        mock.assert();
        assert_eq!(response, RawResponse::new(200, r#"{"status": "paid"}"#));
    }

    #[test]
    fn test_send_post_json_body() {
        let mut server = mockito::Server::new();
        let url = server.url();

        let mock = server
            .mock("POST", "/transactions/create/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"amount": 100.0, "comment": "hi"})))
            .with_status(201)
            .with_body("{}")
            .create();

        let transport = HttpTransport::new().unwrap();
        let request = ApiRequest::post(
            parse_url(format!("{}/transactions/create/", url)),
            "merchant-token",
            json!({"amount": 100.0, "comment": "hi"}),
        )
        .unwrap();
        let response = transport.send(&request).unwrap();

        mock.assert();
        assert_eq!(response.status, 201);
    }

    #[test]
    fn test_send_returns_non_success_statuses() {
        let mut server = mockito::Server::new();
        let url = server.url();

        let mock = server
            .mock("GET", "/x")
            .with_status(503)
            .with_body("upstream down")
            .create();

        let transport = HttpTransport::new().unwrap();
        let response = transport
            .send(&ApiRequest::get(parse_url(format!("{}/x", url)), "t").unwrap())
            .unwrap();

        mock.assert();
        assert_eq!(response, RawResponse::new(503, "upstream down"));
    }

    #[test]
    fn test_send_connection_refused() {
        // Nothing listens on port 9 of the loopback interface in test environments.
        let transport = HttpTransport::new().unwrap();
        let request = ApiRequest::get(parse_url("http://127.0.0.1:9/x".to_string()), "t").unwrap();
        let result = transport.send(&request);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let request = ApiRequest::get(parse_url("http://localhost/x".to_string()), "super-secret").unwrap();
        let printed = format!("{:?}", request);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("Sensitive"));
    }
}
