//! Retry strategy and the per-run retry controller.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How many additional attempts a request may make after the first.
///
/// `Retry { count: 0 }` and `None` both yield a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RetryStrategy {
    #[default]
    None,
    Retry { count: u32 },
}

impl RetryStrategy {
    pub fn retry(count: u32) -> Self {
        RetryStrategy::Retry { count }
    }

    /// Number of retries after the initial attempt.
    pub fn count(&self) -> u32 {
        match self {
            RetryStrategy::None => 0,
            RetryStrategy::Retry { count } => *count,
        }
    }
}

/// Delay inserted before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    #[default]
    None,
    Fixed { delay: Duration },
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `retry` (1 for the first retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay } => *delay,
            Backoff::Exponential { initial, multiplier, max } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let delay_ms = initial.as_millis() as f64 * multiplier.powi(exponent);
                if !delay_ms.is_finite() || delay_ms >= max.as_millis() as f64 {
                    return *max;
                }
                Duration::from_millis(delay_ms.max(0.0) as u64)
            }
        }
    }
}

/// Attempt bookkeeping for a single run, resolved once at pipeline entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryController {
    strategy: RetryStrategy,
    backoff: Backoff,
}

impl RetryController {
    /// Resolve the effective strategy: the request override when present,
    /// otherwise the configured default.
    pub fn resolve(request: Option<RetryStrategy>, configured: RetryStrategy, backoff: Backoff) -> Self {
        Self {
            strategy: request.unwrap_or(configured),
            backoff,
        }
    }

    pub fn strategy(&self) -> RetryStrategy {
        self.strategy
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.strategy.count()) + 1
    }

    /// Attempt numbers of a run, 0-based: the first attempt plus one per retry.
    pub fn attempts(&self) -> RangeInclusive<u32> {
        0..=self.strategy.count()
    }

    /// Whether another attempt may follow attempt number `attempt` (0-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.strategy.count()
    }

    /// Delay to wait before attempt number `attempt` (0-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.backoff.delay_for(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_zero_count_make_one_attempt() {
        let none = RetryController::resolve(None, RetryStrategy::None, Backoff::None);
        let zero = RetryController::resolve(None, RetryStrategy::retry(0), Backoff::None);
        assert_eq!(none.max_attempts(), 1);
        assert_eq!(zero.max_attempts(), 1);
        assert_ne!(RetryStrategy::None, RetryStrategy::retry(0));
    }

    #[test]
    fn request_override_wins() {
        let controller = RetryController::resolve(Some(RetryStrategy::retry(1)), RetryStrategy::retry(5), Backoff::None);
        assert_eq!(controller.strategy(), RetryStrategy::retry(1));
        assert_eq!(controller.max_attempts(), 2);
    }

    #[test]
    fn request_override_can_disable_retries() {
        let controller = RetryController::resolve(Some(RetryStrategy::None), RetryStrategy::retry(3), Backoff::None);
        assert_eq!(controller.max_attempts(), 1);
    }

    #[test]
    fn should_retry_until_count_is_spent() {
        let controller = RetryController::resolve(None, RetryStrategy::retry(2), Backoff::None);
        assert!(controller.should_retry(0));
        assert!(controller.should_retry(1));
        assert!(!controller.should_retry(2));
    }

    #[test]
    fn maximum_count_still_gets_the_extra_attempt() {
        let controller = RetryController::resolve(None, RetryStrategy::retry(u32::MAX), Backoff::None);
        assert_eq!(controller.max_attempts(), u64::from(u32::MAX) + 1);
        assert_eq!(controller.attempts(), 0..=u32::MAX);
        assert!(controller.should_retry(u32::MAX - 1));
        assert!(!controller.should_retry(u32::MAX));
    }

    #[test]
    fn attempts_cover_first_try_and_every_retry() {
        let controller = RetryController::resolve(None, RetryStrategy::retry(2), Backoff::None);
        assert_eq!(controller.attempts().collect::<Vec<_>>(), vec![0, 1, 2]);

        let single = RetryController::resolve(None, RetryStrategy::None, Backoff::None);
        assert_eq!(single.attempts().count(), 1);
    }

    #[test]
    fn first_attempt_never_waits() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(250),
        };
        let controller = RetryController::resolve(None, RetryStrategy::retry(2), backoff);
        assert_eq!(controller.delay_before(0), Duration::ZERO);
        assert_eq!(controller.delay_before(1), Duration::from_millis(250));
        assert_eq!(controller.delay_before(2), Duration::from_millis(250));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(500),
            multiplier: 2.0,
            max: Duration::from_secs(3),
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for(4), Duration::from_secs(3));
        assert_eq!(backoff.delay_for(100), Duration::from_secs(3));
    }

    #[test]
    fn strategy_deserializes_from_tagged_json() {
        let retry: RetryStrategy = serde_json::from_str(r#"{"strategy":"retry","count":3}"#).unwrap();
        assert_eq!(retry, RetryStrategy::retry(3));

        let none: RetryStrategy = serde_json::from_str(r#"{"strategy":"none"}"#).unwrap();
        assert_eq!(none, RetryStrategy::None);
    }

    #[test]
    fn fixed_backoff_deserializes() {
        let backoff: Backoff = serde_json::from_str(r#"{"kind":"fixed","delay":{"secs":1,"nanos":0}}"#).unwrap();
        assert_eq!(
            backoff,
            Backoff::Fixed {
                delay: Duration::from_secs(1)
            }
        );
    }
}
