//! Request execution: headers, transport, rate-limit retries and response classification.

mod classify;
pub mod headers;
mod retry;
mod transport;

pub use classify::classify_response;
pub use retry::{RetryDecision, RetryPolicy, Sleeper, TOO_MANY_REQUESTS, ThreadSleeper, execute};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport, TransportError};

#[cfg(test)]
pub use retry::MockSleeper;
#[cfg(test)]
pub use transport::MockTransport;
