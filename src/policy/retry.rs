use serde::Deserialize;
use std::time::Duration;

/// Bounded retry schedule with capped exponential backoff
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryPolicy {
    /// Total number of HTTP attempts per fetch, including the first (>= 1)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt, in seconds
    #[serde(rename = "base-backoff-seconds", default = "default_base_backoff")]
    pub base_backoff_seconds: f64,

    /// Upper bound for any single backoff, in seconds
    #[serde(rename = "max-backoff-seconds", default = "default_max_backoff")]
    pub max_backoff_seconds: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff() -> f64 {
    0.5
}

fn default_max_backoff() -> f64 {
    8.0
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff_seconds: f64, max_backoff_seconds: f64) -> Self {
        Self {
            max_attempts,
            base_backoff_seconds,
            max_backoff_seconds,
        }
    }

    /// Returns the sleep that follows the failed attempt number `attempt`
    ///
    /// The schedule is `min(base * 2^(attempt - 1), max)`. Attempt numbers
    /// start at 1; attempt 0 is treated as 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use paperclip::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(5, 0.5, 3.0);
    /// assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(500));
    /// assert_eq!(policy.backoff_for_attempt(2), Duration::from_secs(1));
    /// assert_eq!(policy.backoff_for_attempt(3), Duration::from_secs(2));
    /// assert_eq!(policy.backoff_for_attempt(4), Duration::from_secs(3));
    /// ```
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if self.base_backoff_seconds.is_nan() || self.base_backoff_seconds <= 0.0 {
            return Duration::ZERO;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds =
            (self.base_backoff_seconds * 2f64.powi(exponent)).min(self.max_backoff_seconds);

        if seconds.is_finite() && seconds > 0.0 {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }

    /// Whether another attempt may follow attempt number `attempt`
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            default_max_attempts(),
            default_base_backoff(),
            default_max_backoff(),
        )
    }
}
