//! Blocking client for the TsPay merchant API.
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use tspay::{ClientConfig, Payments, TransactionRequest, TsPayClient};
//!
//! # fn main() -> tspay::Result<()> {
//! let client = TsPayClient::new(ClientConfig::new())?;
//! let request = TransactionRequest::new(Decimal::from(15000)).with_comment("order 42");
//! let record = client.create_transaction("merchant-access-token", &request)?;
//!
//! if let Some(cheque_id) = record.cheque_id() {
//!     let status = client.check_transaction("merchant-access-token", cheque_id)?;
//!     println!("{}", status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::{Payments, TsPayClient};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use types::{TransactionRecord, TransactionRequest};
