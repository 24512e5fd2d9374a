//! Storage capability interfaces.
//!
//! A backend implements whichever of these three capability traits it can
//! support atomically. Strategies are generic over the trait(s) they need
//! (§4.B), so pairing a strategy with a storage that lacks the required
//! capability is a compile error, not a runtime surprise.
//!
//! Every method takes the caller's single clock reading as an explicit
//! `now` rather than consulting a clock of its own — see
//! [`crate::clock`] for why that matters.

mod memory;

pub use memory::MemoryStorage;

use crate::clock::Timestamp;
use crate::error::StorageError;

/// Atomic counter-with-TTL primitive, required by Fixed Window and Sliding
/// Window Counter.
pub trait CounterStore: std::fmt::Debug + Send + Sync {
    /// Atomically increments the counter at `key` by `amount`.
    ///
    /// If the key does not exist, or its previous expiry has already
    /// passed, it is (re)created with value `amount` and expiry
    /// `now + expiry_seconds`. Otherwise the existing value is incremented
    /// by `amount`, and the expiry is left untouched unless
    /// `elastic_expiry` is set, in which case it is reset to
    /// `now + expiry_seconds`.
    ///
    /// Returns the counter's new value.
    fn incr(
        &self,
        key: &str,
        expiry_seconds: u64,
        amount: u64,
        elastic_expiry: bool,
        now: Timestamp,
    ) -> Result<u64, StorageError>;

    /// Reads the counter at `key`, or `0` if it is absent or expired.
    fn get(&self, key: &str, now: Timestamp) -> Result<u64, StorageError>;

    /// Reads the absolute expiry of `key`, or `None` if it has none on
    /// record.
    fn get_expiry(&self, key: &str) -> Result<Option<Timestamp>, StorageError>;

    /// Removes `key` entirely.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Moving-window log primitive, required by Moving Window.
pub trait MovingWindowStore: std::fmt::Debug + Send + Sync {
    /// Atomically prunes entries at `key` older than `now - expiry_seconds`
    /// and, if the remaining count is below `limit_amount`, appends `now`.
    ///
    /// An entry whose timestamp is exactly `now - expiry_seconds` is
    /// treated as expired (the retained window is the half-open interval
    /// `(now - expiry_seconds, now]`).
    ///
    /// Returns whether the entry was appended, and the timestamp of the
    /// oldest entry retained after pruning (or `now` if the log is empty).
    fn acquire_entry(
        &self,
        key: &str,
        limit_amount: u64,
        expiry_seconds: u64,
        now: Timestamp,
    ) -> Result<(bool, Timestamp), StorageError>;

    /// Prunes and counts the log at `key` without appending to it.
    fn get_moving_window(
        &self,
        key: &str,
        expiry_seconds: u64,
        now: Timestamp,
    ) -> Result<(u64, Timestamp), StorageError>;

    /// Removes `key` entirely.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Two-bucket sliding window primitive, required by Sliding Window Counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindowSample {
    /// Hits counted in the window immediately preceding the current one.
    pub previous_count: u64,
    /// Hits counted in the window containing `now`.
    pub current_count: u64,
}

pub trait SlidingWindowStore: std::fmt::Debug + Send + Sync {
    /// Atomically resolves the previous/current bucket pair for `key`
    /// relative to `now`, and — if the weighted usage they imply still
    /// admits one more hit against `limit_amount` — increments the current
    /// bucket.
    ///
    /// Returns whether the hit was admitted, and the sample reflecting the
    /// state *after* the operation.
    fn acquire_sliding_window(
        &self,
        key: &str,
        limit_amount: u64,
        window_seconds: u64,
        now: Timestamp,
    ) -> Result<(bool, SlidingWindowSample), StorageError>;

    /// Resolves the previous/current bucket pair for `key` relative to
    /// `now`, without mutating stored state.
    fn get_sliding_window(
        &self,
        key: &str,
        window_seconds: u64,
        now: Timestamp,
    ) -> Result<SlidingWindowSample, StorageError>;

    /// Removes `key` entirely.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}
