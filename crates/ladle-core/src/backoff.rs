//! Exponential backoff for reconnect scheduling.
//!
//! Pure, sync state machine: the session loop asks for the next delay and
//! owns the actual timer. Delay for attempt `n` (1-based) is
//! `base · 2^(n−1)`, with at most `max_attempts` attempts. The counter
//! resets on any successful open.

use std::time::Duration;

/// Default base delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default maximum number of scheduled reconnect attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Reconnect backoff state.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_attempts: u32,
    attempt: u32,
}

impl ReconnectPolicy {
    /// Create a policy with the given base delay and attempt cap.
    #[must_use]
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            attempt: 0,
        }
    }

    /// Delay before the next reconnect attempt, or `None` once the attempt
    /// budget is spent. Each call consumes one attempt.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        let factor = 2u32.checked_pow(self.attempt - 1)?;
        Some(
            self.base_delay
                .checked_mul(factor)
                .unwrap_or(Duration::MAX),
        )
    }

    /// Reset the attempt counter after a successful open.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Attempts consumed since the last reset.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the attempt budget is spent.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            DEFAULT_MAX_ATTEMPTS,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_per_attempt() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(100), 5);
        let delays: Vec<u64> = std::iter::from_fn(|| policy.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1600]);
    }

    #[test]
    fn no_attempt_past_the_cap() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(10), 5);
        for _ in 0..5 {
            assert!(policy.next_delay().is_some());
        }
        // A sixth abnormal close schedules nothing.
        assert_eq!(policy.next_delay(), None);
        assert!(policy.is_exhausted());
    }

    #[test]
    fn reset_restarts_from_attempt_one() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(100), 3);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(200)));
        policy.reset();
        assert_eq!(policy.attempt(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn zero_max_attempts_never_schedules() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(100), 0);
        assert_eq!(policy.next_delay(), None);
        assert!(policy.is_exhausted());
    }

    #[test]
    fn huge_attempt_counts_saturate() {
        let mut policy = ReconnectPolicy::new(Duration::from_secs(u64::MAX / 2), 3);
        let _ = policy.next_delay();
        let _ = policy.next_delay();
        // 4x base overflows Duration; should clamp, not panic.
        assert_eq!(policy.next_delay(), Some(Duration::MAX));
    }

    #[test]
    fn default_matches_constants() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_millis(DEFAULT_BASE_DELAY_MS));
        assert_eq!(policy.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }
}
