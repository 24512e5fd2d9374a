//! The three window strategies, behind one uniform trait.
//!
//! A `Strategy` is generic over the storage capability it needs (§4.B),
//! so pairing e.g. [`MovingWindowStrategy`] with a storage that only
//! implements [`crate::storage::CounterStore`] is a compile error rather
//! than a runtime one.

mod fixed_window;
mod moving_window;
mod sliding_window_counter;

pub use fixed_window::FixedWindowStrategy;
pub use moving_window::MovingWindowStrategy;
pub use sliding_window_counter::SlidingWindowCounterStrategy;

use crate::error::Error;
use crate::limit::Limit;

/// A snapshot of a limit's remaining capacity, returned by
/// [`Strategy::get_window_stats`].
///
/// This is a read-only snapshot, not a reservation: by the time a caller
/// acts on it, a concurrent `hit` may have already changed the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// How many more hits this window would currently admit.
    pub remaining: u64,
    /// The epoch second at which a denied hit is expected to succeed.
    pub reset_time: u64,
}

/// The common interface implemented by all three window algorithms.
pub trait Strategy {
    /// Attempts to admit one hit against `limit` for `identity`.
    ///
    /// Returns `Ok(true)` if admitted, `Ok(false)` if the limit denied it.
    /// Any other failure (storage unreachable, retry budget exhausted) is
    /// an `Err` — callers must not conflate "denied" with "unreachable".
    fn hit(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error>;

    /// Checks whether a hit would currently be admitted, without
    /// consuming capacity.
    ///
    /// This is a snapshot and is not linearizable with respect to
    /// concurrent `hit` calls.
    fn test(&self, limit: &Limit, identity: &[&str]) -> Result<bool, Error>;

    /// Reports the remaining capacity and expected reset time for `limit`
    /// and `identity`.
    fn get_window_stats(&self, limit: &Limit, identity: &[&str]) -> Result<WindowStats, Error>;

    /// Clears all state for `limit` and `identity`.
    fn clear(&self, limit: &Limit, identity: &[&str]) -> Result<(), Error>;
}

#[inline]
pub(crate) fn window_start_epoch(now_secs: f64, window_seconds: u64) -> u64 {
    ((now_secs / window_seconds as f64).floor() as u64) * window_seconds
}
