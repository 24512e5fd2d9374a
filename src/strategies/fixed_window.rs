//! Fixed Window strategy (§4.C).
//!
//! Divides time into fixed, non-overlapping intervals and counts hits
//! per interval. Simple and cheap, but it admits up to `2 × amount` hits
//! in a short span straddling a window boundary — see
//! [`crate::strategies::MovingWindowStrategy`] for a strategy that closes
//! that gap.

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::limit::Limit;
use crate::storage::CounterStore;

use super::{Strategy, WindowStats, window_start_epoch};

/// A rate limiter using a single counter bucketed by wall-clock window
/// start.
///
/// The bucket's key embeds the window's start epoch, so the window itself
/// needs no explicit reset: a new window is simply a new key, and the old
/// one is reclaimed by the storage's TTL.
#[derive(Debug)]
pub struct FixedWindowStrategy<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: CounterStore> FixedWindowStrategy<S, SystemClock> {
    /// Creates a strategy backed by `storage` and the system clock.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock::default(),
        }
    }
}

impl<S: CounterStore, C: Clock> FixedWindowStrategy<S, C> {
    /// Creates a strategy backed by `storage` and an explicit `clock`,
    /// primarily for deterministic testing with [`crate::clock::MockClock`].
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    fn key(&self, limit: &Limit, identity: &[&str], window_start: u64) -> String {
        format!("{}\u{1f}{window_start}", limit.storage_key(identity))
    }
}

impl<S: CounterStore, C: Clock> Strategy for FixedWindowStrategy<S, C> {
    fn hit(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let window_start = window_start_epoch(now.as_secs_f64(), limit.window_seconds());
        let key = self.key(limit, identity, window_start);
        let value = self
            .storage
            .incr(&key, limit.window_seconds(), 1, false, now)?;
        Ok(value <= limit.amount())
    }

    fn test(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let window_start = window_start_epoch(now.as_secs_f64(), limit.window_seconds());
        let key = self.key(limit, identity, window_start);
        Ok(self.storage.get(&key, now)? < limit.amount())
    }

    fn get_window_stats(&self, limit: &Limit, identity: &[&str]) -> Result<WindowStats, Error> {
        let now = self.clock.now();
        let window_seconds = limit.window_seconds();
        let window_start = window_start_epoch(now.as_secs_f64(), window_seconds);
        let key = self.key(limit, identity, window_start);
        let used = self.storage.get(&key, now)?;
        Ok(WindowStats {
            remaining: limit.amount().saturating_sub(used),
            reset_time: window_start + window_seconds,
        })
    }

    fn clear(&self, limit: &Limit, identity: &[&str]) -> Result<(), Error> {
        let now = self.clock.now();
        let window_start = window_start_epoch(now.as_secs_f64(), limit.window_seconds());
        let key = self.key(limit, identity, window_start);
        Ok(self.storage.clear(&key)?)
    }
}
