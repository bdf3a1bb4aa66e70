use crate::config::RetryConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized exponential backoff with caps.
///
/// `attempt` is 0-based: attempt 0 is the first send. A retry after
/// attempt `a` is allowed while `a < max_retries`, so a request is sent at
/// most `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Lower bound of every delay.
    pub min_delay: Duration,
    /// Upper bound of every delay.
    pub max_delay: Duration,
    /// Growth factor per attempt.
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            min_delay: secs(cfg.min_delay_secs),
            max_delay: secs(cfg.max_delay_secs),
            factor: cfg.delay_factor,
        }
    }
}

/// Seconds from config; values too large for a `Duration` saturate.
fn secs(v: f64) -> Duration {
    if v.is_finite() && v > 0.0 {
        Duration::try_from_secs_f64(v).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

impl BackoffPolicy {
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Jittered delay to wait after `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.5..=1.0);
        self.delay_with_jitter(attempt, jitter)
    }

    /// Delay for `attempt` with an explicit jitter multiplier.
    ///
    /// `min + jitter * (min(min * factor^attempt, max) - min)`; `jitter` is
    /// clamped to `[0, 1]` so the result always lies in `[min, max]`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let min = self.min_delay.as_secs_f64();
        let max = self.max_delay.as_secs_f64().max(min);
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let mut base = min * self.factor.powi(exp);
        if !base.is_finite() || base > max {
            base = max;
        }
        let base = base.max(min);
        let jitter = if jitter.is_finite() { jitter.clamp(0.0, 1.0) } else { 1.0 };
        Duration::try_from_secs_f64(min + jitter * (base - min))
            .unwrap_or(self.max_delay.max(self.min_delay))
    }

    /// The sleep to perform before retrying after `attempt`, or `None` once
    /// retries are exhausted.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            tracing::debug!(attempt, max_retries = self.max_retries, "retries exhausted");
            return None;
        }
        let delay = self.delay_for(attempt);
        tracing::debug!(attempt, ?delay, "backing off before retry");
        Some(delay)
    }
}
