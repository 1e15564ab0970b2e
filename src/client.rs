use log::debug;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{
    ApiRequest, HttpTransport, RetryPolicy, Sleeper, ThreadSleeper, Transport, execute,
};
use crate::types::{TransactionRecord, TransactionRequest};

/// Merchant-facing operations of the TsPay API.
#[cfg_attr(test, mockall::automock)]
pub trait Payments: Send + Sync {
    /// Creates a transaction and returns the record nested under `transaction`
    /// in the response.
    fn create_transaction(
        &self,
        credential: &str,
        request: &TransactionRequest,
    ) -> Result<TransactionRecord>;

    /// Looks a transaction up by cheque id and returns the response body as is.
    fn check_transaction(&self, credential: &str, cheque_id: &str) -> Result<Value>;
}

/// Blocking TsPay client.
///
/// Holds nothing but its configuration and collaborators, so one instance can
/// be shared by any number of threads; each call is an independent exchange.
pub struct TsPayClient<T = HttpTransport, S = ThreadSleeper> {
    config: ClientConfig,
    policy: RetryPolicy,
    transport: T,
    sleeper: S,
}

impl TsPayClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_parts(config, HttpTransport::new()?, ThreadSleeper))
    }
}

impl<T: Transport, S: Sleeper> TsPayClient<T, S> {
    pub fn with_parts(config: ClientConfig, transport: T, sleeper: S) -> Self {
        let policy = RetryPolicy::from(&config);
        Self {
            config,
            policy,
            transport,
            sleeper,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl<T: Transport, S: Sleeper> Payments for TsPayClient<T, S> {
    #[tracing::instrument(skip(self, credential, request))]
    fn create_transaction(
        &self,
        credential: &str,
        request: &TransactionRequest,
    ) -> Result<TransactionRecord> {
        if credential.is_empty() {
            return Err(Error::authentication("Missing merchant access_token"));
        }

        let body = serde_json::to_value(request).map_err(|e| {
            Error::invalid_request(format!("Failed to encode transaction request: {}", e))
        })?;
        let url = self.config.endpoint(&["transactions", "create"])?;
        let api_request = ApiRequest::post(url, credential, body)?;

        debug!("Creating transaction for amount {}...", request.amount);

        let response = execute(
            &self.transport,
            &self.sleeper,
            &self.policy,
            "creating transaction",
            &api_request,
        )?;

        unwrap_transaction(response)
    }

    #[tracing::instrument(skip(self, credential))]
    fn check_transaction(&self, credential: &str, cheque_id: &str) -> Result<Value> {
        if cheque_id.is_empty() {
            return Err(Error::invalid_request("Missing cheque_id"));
        }
        // Dot segments cannot be encoded and would resolve to another path.
        if cheque_id == "." || cheque_id == ".." {
            return Err(Error::invalid_request("cheque_id cannot be a dot segment"));
        }
        if credential.is_empty() {
            return Err(Error::authentication("Missing merchant access_token"));
        }

        let url = self.config.endpoint(&["transactions", cheque_id])?;
        let api_request = ApiRequest::get(url, credential)?;

        debug!("Checking transaction {}...", cheque_id);

        execute(
            &self.transport,
            &self.sleeper,
            &self.policy,
            "checking transaction",
            &api_request,
        )
    }
}

/// Pulls the record out of the create-transaction envelope.
///
/// A missing, null, empty or non-object `transaction` is a service failure
/// carrying the whole decoded body.
fn unwrap_transaction(body: Value) -> Result<TransactionRecord> {
    let record = match body.get("transaction") {
        Some(Value::Object(map)) if !map.is_empty() => Some(map.clone()),
        _ => None,
    };

    match record {
        Some(map) => Ok(TransactionRecord::from(map)),
        None => Err(Error::service("Transaction data missing in response").with_details(Some(body))),
    }
}
