use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backoff schedule for transient transformation failures (transport errors,
/// timeouts, 429 and 5xx).
///
/// The wait before retry `n` (0-based) is `initial_backoff_ms * backoff_factor^n`,
/// capped at `max_backoff_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first call; `0` means a single attempt.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: f64,
    pub max_backoff_ms: u64,
}

const INITIAL_BACKOFF_MS: u64 = 2_000;
const BACKOFF_FACTOR: f64 = 2.0;
const MAX_BACKOFF_MS: u64 = 30_000;

impl Default for RetryPolicy {
    /// Two retries starting at 2s.
    fn default() -> Self {
        Self::exponential(2, INITIAL_BACKOFF_MS, BACKOFF_FACTOR)
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: INITIAL_BACKOFF_MS,
            backoff_factor: BACKOFF_FACTOR,
            max_backoff_ms: MAX_BACKOFF_MS,
        }
    }

    /// Zero or negative inputs fall back to 2s and a factor of 2.
    pub fn exponential(max_retries: u32, initial_backoff_ms: u64, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms: if initial_backoff_ms == 0 {
                INITIAL_BACKOFF_MS
            } else {
                initial_backoff_ms
            },
            backoff_factor: if backoff_factor > 0.0 {
                backoff_factor
            } else {
                BACKOFF_FACTOR
            },
            max_backoff_ms: MAX_BACKOFF_MS,
        }
    }

    /// Keeps the current schedule but changes how many retries are allowed.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_backoff_ms(mut self, max_backoff_ms: u64) -> Self {
        self.max_backoff_ms = max_backoff_ms.max(1);
        self
    }

    /// Total calls the client may make, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn can_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Wait before retry number `retries_done` (0-based).
    pub fn backoff_duration(&self, retries_done: u32) -> Duration {
        if self.max_retries == 0 {
            return Duration::ZERO;
        }
        let scaled = self.initial_backoff_ms as f64 * self.backoff_factor.powi(retries_done as i32);
        let capped = (scaled.round() as u64).min(self.max_backoff_ms.max(1));
        Duration::from_millis(capped)
    }

    /// Every wait the policy can schedule, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|n| self.backoff_duration(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::RetryPolicy;
    use std::time::Duration;

    #[test]
    fn default_retries_twice_from_two_seconds() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(
            p.schedule(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn none_is_a_single_attempt() {
        let p = RetryPolicy::none();
        assert_eq!(p.max_attempts(), 1);
        assert!(!p.can_retry(0));
        assert!(p.schedule().is_empty());
        assert_eq!(p.backoff_duration(0), Duration::ZERO);
    }

    #[test]
    fn backoff_is_capped() {
        let p = RetryPolicy::exponential(4, 10_000, 3.0);
        assert_eq!(
            p.schedule(),
            vec![
                Duration::from_secs(10),
                Duration::from_secs(30),
                Duration::from_secs(30),
                Duration::from_secs(30),
            ]
        );
        let tight = RetryPolicy::exponential(3, 100, 2.0).with_max_backoff_ms(250);
        assert_eq!(tight.backoff_duration(2).as_millis(), 250);
    }

    #[test]
    fn invalid_inputs_fall_back_to_defaults() {
        let p = RetryPolicy::exponential(1, 0, -1.0);
        assert_eq!(p.initial_backoff_ms, 2_000);
        assert_eq!(p.backoff_factor, 2.0);
        assert_eq!(RetryPolicy::none().with_max_retries(5).max_attempts(), 6);
    }

    #[test]
    fn partial_config_keeps_default_schedule() {
        let p: RetryPolicy = serde_json::from_str(r#"{"max_retries":1}"#).expect("policy");
        assert_eq!(p.max_retries, 1);
        assert_eq!(p.initial_backoff_ms, 2_000);
        assert_eq!(p.max_backoff_ms, 30_000);
    }
}
