//! Jittered exponential backoff shared by the media client's retry policy
//! (spec §4.2) and the trunk supervisor's reconnection loop (spec §4.3).
//!
//! Grounded on `sa_node_sdk::reconnect::ReconnectBackoff`, generalized so
//! both collaborators configure it from their own config sections instead
//! of hard-coding the constants the teacher's node client used.

use std::time::Duration;

/// Delay formula: `min(base * multiplier^attempt, max)`, optionally jittered.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration, multiplier: f64, jitter: bool) -> Self {
        Self {
            base,
            max,
            multiplier,
            jitter,
        }
    }

    /// Delay for attempt `n` (0-indexed). `jitter_seed` selects a
    /// deterministic pseudo-random fraction in `[0, 1)` — callers pass a
    /// value that varies per call (e.g. the attempt number) so repeated
    /// attempts don't collide in a thundering herd.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.base.as_millis() as f64;
        let delay_ms = base_ms * self.multiplier.powi(attempt as i32);
        let capped_ms = delay_ms.min(self.max.as_millis() as f64);

        if !self.jitter {
            return Duration::from_millis(capped_ms as u64);
        }

        // Uniform +/-25% jitter, spec §4.2: "optionally with uniform ±25%
        // jitter". Deterministic in the attempt number rather than a true
        // RNG — cheap, testable, and sufficient to spread a reconnect storm.
        let fraction = pseudo_random_fraction(attempt);
        let jitter_ms = capped_ms * 0.25 * (2.0 * fraction - 1.0);
        Duration::from_millis((capped_ms + jitter_ms).max(0.0) as u64)
    }

    pub fn should_give_up(&self, attempt: u32, max_attempts: u32) -> bool {
        max_attempts > 0 && attempt >= max_attempts
    }
}

fn pseudo_random_fraction(attempt: u32) -> f64 {
    let hash = attempt.wrapping_mul(2654435761);
    (hash as f64) / (u32::MAX as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_with_attempt() {
        let p = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(60), 2.0, false);
        assert!(p.delay_for_attempt(1) > p.delay_for_attempt(0));
        assert!(p.delay_for_attempt(2) > p.delay_for_attempt(1));
    }

    #[test]
    fn delay_capped_at_max() {
        let p = BackoffPolicy::new(Duration::from_secs(10), Duration::from_secs(30), 10.0, false);
        assert_eq!(p.delay_for_attempt(10), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let p = BackoffPolicy::new(Duration::from_secs(10), Duration::from_secs(30), 10.0, true);
        let d = p.delay_for_attempt(10).as_millis();
        assert!(d >= 22_500 && d <= 37_500, "got {d}");
    }

    #[test]
    fn give_up_respects_max_attempts() {
        let p = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(60), 2.0, false);
        assert!(!p.should_give_up(2, 3));
        assert!(p.should_give_up(3, 3));
    }

    #[test]
    fn zero_max_attempts_means_unlimited() {
        let p = BackoffPolicy::new(Duration::from_secs(1), Duration::from_secs(60), 2.0, false);
        assert!(!p.should_give_up(1_000_000, 0));
    }
}
