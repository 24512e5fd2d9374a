//! Moving Window strategy (§4.D).
//!
//! Keeps a timestamped log of hits and admits a new one only if fewer
//! than `amount` remain within the trailing `window_seconds`. Unlike
//! [`crate::strategies::FixedWindowStrategy`], it never admits more than
//! `amount` hits in any trailing window, at the cost of keeping a log
//! per key instead of a single counter.

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::limit::Limit;
use crate::storage::MovingWindowStore;

use super::{Strategy, WindowStats};

/// A rate limiter using a timestamped log of hits within the last
/// `window_seconds`.
#[derive(Debug)]
pub struct MovingWindowStrategy<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: MovingWindowStore> MovingWindowStrategy<S, SystemClock> {
    /// Creates a strategy backed by `storage` and the system clock.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock::default(),
        }
    }
}

impl<S: MovingWindowStore, C: Clock> MovingWindowStrategy<S, C> {
    /// Creates a strategy backed by `storage` and an explicit `clock`,
    /// primarily for deterministic testing with [`crate::clock::MockClock`].
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }
}

impl<S: MovingWindowStore, C: Clock> Strategy for MovingWindowStrategy<S, C> {
    fn hit(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let key = limit.storage_key(identity);
        let (acquired, _) = self
            .storage
            .acquire_entry(&key, limit.amount(), limit.window_seconds(), now)?;
        Ok(acquired)
    }

    fn test(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error> {
        let now = self.clock.now();
        let key = limit.storage_key(identity);
        let (count, _) = self
            .storage
            .get_moving_window(&key, limit.window_seconds(), now)?;
        Ok(count < limit.amount())
    }

    fn get_window_stats(&self, limit: &Limit, identity: &[&str]) -> Result<WindowStats, Error> {
        let now = self.clock.now();
        let key = limit.storage_key(identity);
        let (count, oldest) = self
            .storage
            .get_moving_window(&key, limit.window_seconds(), now)?;
        let remaining = limit.amount().saturating_sub(count);
        let reset_time = if count > 0 {
            (oldest.as_secs_f64() + limit.window_seconds() as f64).ceil() as u64
        } else {
            now.as_secs()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::limit::Granularity;
    use crate::storage::MemoryStorage;

    fn strategy(clock: MockClock) -> MovingWindowStrategy<MemoryStorage, MockClock> {
        MovingWindowStrategy::with_clock(MemoryStorage::new(), clock)
    }

    #[test]
    fn scenario_one_per_minute() {
        let clock = MockClock::new(0.0);
        let rl = strategy(clock.clone());
        let limit = Limit::new(1, 1, Granularity::Minute);

        assert!(rl.hit(&limit, &["id"]).unwrap());
        clock.set(30.0);
        assert!(!rl.hit(&limit, &["id"]).unwrap());
        clock.set(59.999);
        assert!(!rl.hit(&limit, &["id"]).unwrap());
        clock.set(60.001);
        assert!(rl.hit(&limit, &["id"]).unwrap());
    }

    #[test]
    fn never_admits_more_than_amount_across_a_boundary() {
        let clock = MockClock::new(59.0);
        let rl = strategy(clock.clone());
        let limit = Limit::new(10, 1, Granularity::Minute);

        for _ in 0..10 {
            assert!(rl.hit(&limit, &["id"]).unwrap());
        }
        clock.set(60.0);
        let admitted_at_60: usize = (0..10).filter(|_| rl.hit(&limit, &["id"]).unwrap()).count();
        assert_eq!(admitted_at_60, 0, "moving window admits none immediately after the fixed-window boundary");

        clock.set(119.5);
        let admitted_at_119_5: usize = (0..10).filter(|_| rl.hit(&limit, &["id"]).unwrap()).count();
        assert_eq!(admitted_at_119_5, 10);
    }

    #[test]
    fn test_is_a_snapshot_and_does_not_mutate() {
        let clock = MockClock::new(0.0);
        let rl = strategy(clock.clone());
        let limit = Limit::new(1, 1, Granularity::Second);

        assert!(rl.hit(&limit, &["id"]).unwrap());
        assert!(!rl.hit(&limit, &["id"]).unwrap());

        clock.set(0.1);
        for _ in 0..5 {
            assert!(!rl.test(&limit, &["id"]).unwrap());
        }
    }

    #[test]
    fn isolation_across_identities() {
        let clock = MockClock::new(0.0);
        let rl = strategy(clock);
        let limit = Limit::new(1, 1, Granularity::Minute);

        assert!(rl.hit(&limit, &["a"]).unwrap());
        assert!(!rl.hit(&limit, &["a"]).unwrap());
        assert!(rl.hit(&limit, &["b"]).unwrap());
    }

    #[test]
    fn reset_time_allows_a_previously_denied_hit() {
        let clock = MockClock::new(0.0);
        let rl = strategy(clock.clone());
        let limit = Limit::new(1, 1, Granularity::Second);

        assert!(rl.hit(&limit, &["id"]).unwrap());
        assert!(!rl.hit(&limit, &["id"]).unwrap());
        let stats = rl.get_window_stats(&limit, &["id"]).unwrap();

        clock.set(stats.reset_time as f64 + 0.001);
        assert!(rl.hit(&limit, &["id"]).unwrap());
    }

    #[test]
    fn clear_resets_the_log() {
        let clock = MockClock::new(0.0);
        let rl = strategy(clock);
        let limit = Limit::new(1, 1, Granularity::Minute);

        assert!(rl.hit(&limit, &["id"]).unwrap());
        assert!(!rl.hit(&limit, &["id"]).unwrap());
        rl.clear(&limit, &["id"]).unwrap();
        assert!(rl.hit(&limit, &["id"]).unwrap());
    }
}
