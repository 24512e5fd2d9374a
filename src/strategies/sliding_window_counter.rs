//! Sliding Window Counter strategy (§4.E).
//!
//! Approximates a true moving window with two fixed-window counters,
//! weighting the previous window's count by how much of it still
//! overlaps the trailing `window_seconds`. Cheaper than
//! [`crate::strategies::MovingWindowStrategy`] (two counters instead of a
//! log), at the cost of being an approximation rather than exact.

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::limit::Limit;
use crate::storage::{SlidingWindowSample, SlidingWindowStore};

use super::{Strategy, WindowStats, window_start_epoch};

/// A rate limiter using the weighted sum of the previous and current
/// fixed-window counts.
#[derive(Debug)]
pub struct SlidingWindowCounterStrategy<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: SlidingWindowStore> SlidingWindowCounterStrategy<S, SystemClock> {
    /// Creates a strategy backed by `storage` and the system clock.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock::default(),
        }
    }
}

impl<S: SlidingWindowStore, C: Clock> SlidingWindowCounterStrategy<S, C> {
    /// Creates a strategy backed by `storage` and an explicit `clock`,
    /// primarily for deterministic testing with [`crate::clock::MockClock`].
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }
}

fn weighted_usage(sample: SlidingWindowSample, elapsed: f64, window_seconds: f64) -> f64 {
    let weight = ((window_seconds - elapsed) / window_seconds).clamp(0.0, 1.0);
    sample.previous_count as f64 * weight + sample.current_count as f64
}

impl<S: SlidingWindowStore, C: Clock> Strategy for SlidingWindowCounterStrategy<S, C> {
    fn hit(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let key = limit.storage_key(identity);
        let (admitted, _) =
            self.storage
                .acquire_sliding_window(&key, limit.amount(), limit.window_seconds(), now)?;
        Ok(admitted)
    }

    fn test(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let window_seconds = limit.window_seconds();
        let key = limit.storage_key(identity);
        let sample = self.storage.get_sliding_window(&key, window_seconds, now)?;
        let current_start = window_start_epoch(now.as_secs_f64(), window_seconds);
        let elapsed = now.as_secs_f64() - current_start as f64;
        let usage = weighted_usage(sample, elapsed, window_seconds as f64);
        Ok(usage < limit.amount() as f64)
    }

    fn get_window_stats(&self, limit: &Limit, identity: &[&str]) -> Result<WindowStats, Error> {
        let now = self.clock.now();
        let window_seconds = limit.window_seconds();
        let key = limit.storage_key(identity);
        let sample = self.storage.get_sliding_window(&key, window_seconds, now)?;
        let current_start = window_start_epoch(now.as_secs_f64(), window_seconds);
        let elapsed = now.as_secs_f64() - current_start as f64;
        let usage = weighted_usage(sample, elapsed, window_seconds as f64);

        let remaining = (limit.amount() as f64 - usage).floor().max(0.0) as u64;

        let reset_time = if sample.previous_count == 0 {
            current_start + window_seconds
        } else {
            let fraction = 1.0
                - ((limit.amount() as f64 - sample.current_count as f64)
                    / sample.previous_count.max(1) as f64);
            let candidate = current_start as f64 + window_seconds as f64 * fraction;
            candidate.clamp(now.as_secs_f64(), (current_start + window_seconds) as f64) as u64
        };

        Ok(WindowStats {
            remaining,
            reset_time,
        })
    }

    fn clear(&self, limit: &Limit, identity: &[&str]) -> Result<(), Error> {
        let key = limit.storage_key(identity);
        Ok(self.storage.clear(&key)?)
    }
}
