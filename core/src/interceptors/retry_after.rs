use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::BoxError;
use crate::interceptor::ResponseInterceptor;
use crate::response::InterceptedResponse;

const RETRY_AFTER: &str = "Retry-After";
const TOO_MANY_REQUESTS: u16 = 429;
const SERVICE_UNAVAILABLE: u16 = 503;

/// When the server asked the client to come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    Delay(Duration),
    At(SystemTime),
}

/// The server answered 429 or 503 with a parsable `Retry-After` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server asked to retry after {retry_after:?} (status {status})")]
pub struct RetryAfterError {
    pub retry_after: RetryAfter,
    pub status: u16,
}

impl RetryAfterError {
    /// Time left to wait, measured from `now`.
    pub fn delay_from(&self, now: SystemTime) -> Duration {
        match self.retry_after {
            RetryAfter::Delay(delay) => delay,
            RetryAfter::At(at) => at.duration_since(now).unwrap_or(Duration::ZERO),
        }
    }
}

/// Turns rate-limit responses into a `RetryAfterError`.
///
/// Only 429 and 503 are inspected. The header is read as whole seconds, then
/// as an HTTP-date; a missing or unparsable header lets the response through.
///
/// Response interceptors only run after status validation. With the default
/// `AcceptableStatus` (`200..=299`) a 429 or 503 fails as
/// `UnacceptableStatusCode` before reaching this interceptor, so the accepted
/// set must include the codes it should inspect:
///
/// ```
/// use micro_client::AcceptableStatus;
///
/// let acceptable = AcceptableStatus::ranges([200..=299, 429..=429, 503..=503]);
/// assert!(acceptable.contains(429));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryAfterInterceptor;

impl RetryAfterInterceptor {
    pub fn new() -> Self {
        Self
    }
}

fn parse_retry_after(value: &str) -> Option<RetryAfter> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(RetryAfter::Delay(Duration::from_secs(seconds)));
    }
    httpdate::parse_http_date(value).ok().map(RetryAfter::At)
}

#[async_trait]
impl ResponseInterceptor for RetryAfterInterceptor {
    async fn intercept(&self, response: InterceptedResponse, _data: &[u8]) -> Result<InterceptedResponse, BoxError> {
        let status = response.status();
        if status != TOO_MANY_REQUESTS && status != SERVICE_UNAVAILABLE {
            return Ok(response);
        }
        match response.metadata.headers.get(RETRY_AFTER).and_then(parse_retry_after) {
            Some(retry_after) => Err(Box::new(RetryAfterError { retry_after, status })),
            None => Ok(response),
        }
    }
}
