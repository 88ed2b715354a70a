//! Heartbeat scheduling for periodic `ping` probes.
//!
//! The monitor only decides *when* to probe; the session loop owns the
//! socket and does the sending. No liveness timeout is enforced here —
//! the transport's own close/error signaling is the failure detector.
//! While stopped, [`Heartbeat::tick`] pends forever so it composes
//! directly into the session `select!`.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Periodic tick source, active only between `start` and `stop`.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    ticker: Option<Interval>,
}

impl Heartbeat {
    /// Create a stopped heartbeat with the given cadence.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticker: None,
        }
    }

    /// Begin ticking. The first tick fires one full interval from now,
    /// not immediately. Restarting resets the schedule.
    pub fn start(&mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }

    /// Stop ticking. Must be called on intentional close so no probe is
    /// sent on a dead connection.
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Whether the heartbeat is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Wait for the next tick; pends forever while stopped.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                let _ = ticker.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_interval() {
        let mut hb = Heartbeat::new(Duration::from_secs(30));
        hb.start();

        let early = tokio::time::timeout(Duration::from_secs(29), hb.tick()).await;
        assert!(early.is_err(), "tick fired before the interval elapsed");

        let due = tokio::time::timeout(Duration::from_secs(2), hb.tick()).await;
        assert!(due.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_repeat_at_cadence() {
        let mut hb = Heartbeat::new(Duration::from_secs(10));
        hb.start();
        for _ in 0..3 {
            let tick = tokio::time::timeout(Duration::from_secs(11), hb.tick()).await;
            assert!(tick.is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_heartbeat_never_ticks() {
        let mut hb = Heartbeat::new(Duration::from_millis(10));
        assert!(!hb.is_running());
        let tick = tokio::time::timeout(Duration::from_secs(60), hb.tick()).await;
        assert!(tick.is_err(), "stopped heartbeat must pend forever");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_ticks() {
        let mut hb = Heartbeat::new(Duration::from_secs(5));
        hb.start();
        assert!(hb.is_running());
        hb.stop();
        let tick = tokio::time::timeout(Duration::from_secs(60), hb.tick()).await;
        assert!(tick.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_schedule() {
        let mut hb = Heartbeat::new(Duration::from_secs(10));
        hb.start();
        tokio::time::advance(Duration::from_secs(9)).await;
        hb.start();
        // The old schedule would have fired in 1s; the new one needs 10s.
        let early = tokio::time::timeout(Duration::from_secs(5), hb.tick()).await;
        assert!(early.is_err());
    }
}
