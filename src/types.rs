use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a "create transaction" call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub amount: Decimal,
    pub redirect_url: String,
    pub comment: String,
}

impl TransactionRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            redirect_url: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = redirect_url.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A transaction as the backend describes it. Its fields are not validated.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct TransactionRecord(Map<String, Value>);

impl TransactionRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reference used to look the transaction up later.
    pub fn cheque_id(&self) -> Option<&str> {
        self.0.get("cheque_id").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for TransactionRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<TransactionRecord> for Value {
    fn from(record: TransactionRecord) -> Self {
        Value::Object(record.0)
    }
}
