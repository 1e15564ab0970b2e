//! Rate-limit retry policy and the loop that drives it.
//!
//! Only HTTP 429 is retried. Transport failures and every other status end the
//! call on the attempt that produced them.

use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;

use super::classify::{body_details, classify_response};
use super::transport::{ApiRequest, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Status the backend uses to ask clients to slow down.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// What to do with the response of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then make another attempt. The response is not classified.
    Retry(Duration),
    /// Rate-limited on the last allowed attempt.
    Exhausted,
    /// Hand the response to the classifier; the loop ends.
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decides the fate of `attempt` (1-based) given the status it received.
    pub fn decide(&self, attempt: u32, status: u16) -> RetryDecision {
        if status != TOO_MANY_REQUESTS {
            RetryDecision::Settle
        } else if attempt < self.max_retries {
            RetryDecision::Retry(self.retry_delay)
        } else {
            RetryDecision::Exhausted
        }
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        RetryPolicy::new(config.max_retries(), config.retry_delay())
    }
}

/// Blocks the calling thread between attempts.
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sends `request` until the policy settles, then classifies the final response.
///
/// `operation` names the call in log lines and network failure messages.
pub fn execute<T, S>(
    transport: &T,
    sleeper: &S,
    policy: &RetryPolicy,
    operation: &str,
    request: &ApiRequest,
) -> Result<Value>
where
    T: Transport + ?Sized,
    S: Sleeper + ?Sized,
{
    let max_retries = policy.max_retries();

    for attempt in 1..=max_retries {
        let response = transport.send(request).map_err(|e| {
            debug!("{}: transport failure on attempt {}: {}", operation, attempt, e);
            Error::network(format!("Network error while {}: {}", operation, e))
        })?;

        match policy.decide(attempt, response.status) {
            RetryDecision::Retry(delay) => {
                warn!(
                    "{}: 429 Too Many Requests, retrying in {:?} (attempt {}/{})",
                    operation, delay, attempt, max_retries
                );
                sleeper.sleep(delay);
            }
            RetryDecision::Exhausted => {
                warn!(
                    "{}: still rate-limited after {} attempts, giving up",
                    operation, max_retries
                );
                return Err(Error::rate_limit_exhausted().with_details(body_details(&response.body)));
            }
            RetryDecision::Settle => return classify_response(&response),
        }
    }

    // The last attempt always settles or exhausts; kept so the loop has a value.
    Err(Error::rate_limit_exhausted())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::transport::{MockTransport, RawResponse, TransportError};
    use mockall::Sequence;
    use mockall::predicate::eq;
    use serde_json::json;

    fn request() -> ApiRequest {
        let url = reqwest::Url::parse("http://localhost/transactions/abc/").unwrap();
        ApiRequest::get(url, "merchant-token").unwrap()
    }

    #[test]
    fn test_decide_non_429_settles() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        for status in [200, 201, 400, 401, 404, 500, 503] {
            assert_eq!(policy.decide(1, status), RetryDecision::Settle);
            assert_eq!(policy.decide(3, status), RetryDecision::Settle);
        }
    }

    #[test]
    fn test_decide_429_before_last_attempt_retries() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        assert_eq!(
            policy.decide(1, 429),
            RetryDecision::Retry(Duration::from_secs(3))
        );
        assert_eq!(
            policy.decide(2, 429),
            RetryDecision::Retry(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_decide_429_on_last_attempt_exhausts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        assert_eq!(policy.decide(3, 429), RetryDecision::Exhausted);

        let single = RetryPolicy::new(1, Duration::ZERO);
        assert_eq!(single.decide(1, 429), RetryDecision::Exhausted);
    }

    #[test]
    fn test_policy_raises_zero_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_retries(), 1);
    }

    #[test_log::test]
    fn test_execute_retries_then_succeeds() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();
        transport
            .expect_send()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(429, "")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(200, r#"{"status": "paid"}"#)));

        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_millis(250)))
            .times(2)
            .return_const(());

        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        let value = execute(&transport, &sleeper, &policy, "checking transaction", &request())
            .unwrap();

        assert_eq!(value, json!({"status": "paid"}));
    }

    #[test_log::test]
    fn test_execute_exhausts_on_persistent_429() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Ok(RawResponse::new(429, "Too Many Requests")));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(2).return_const(());

        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let err = execute(&transport, &sleeper, &policy, "checking transaction", &request())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimitExhausted);
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.details(), Some(&json!("Too Many Requests")));
    }

    #[test]
    fn test_execute_transport_failure_is_not_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError("connection refused".to_string())));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let err = execute(&transport, &sleeper, &policy, "creating transaction", &request())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status_code(), None);
        assert!(err.message().contains("creating transaction"));
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn test_execute_transport_failure_after_429() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(429, "")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError("timed out".to_string())));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(1).return_const(());

        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let err = execute(&transport, &sleeper, &policy, "checking transaction", &request())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_execute_server_error_is_terminal() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(RawResponse::new(500, "boom")));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();

        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let err = execute(&transport, &sleeper, &policy, "checking transaction", &request())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status_code(), Some(500));
    }
}
