//! Wall-clock abstraction shared by every strategy call.
//!
//! Every operation in this crate reads the clock exactly once, at entry,
//! and threads that single reading through every storage call it makes.
//! Splitting a read across multiple `Clock::now()` calls inside one
//! operation would reintroduce exactly the kind of internal inconsistency
//! this abstraction exists to avoid.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use quanta::Clock as QuantaClock;
use quanta::Instant as QuantaInstant;

/// A point in time expressed as seconds (with sub-second resolution) since
/// the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Builds a timestamp from fractional seconds since the epoch.
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp(secs.max(0.0))
    }

    /// Fractional seconds since the epoch.
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// Whole seconds since the epoch, rounded down.
    #[inline]
    pub fn as_secs(self) -> u64 {
        self.0.floor() as u64
    }

    /// Microseconds since the epoch, saturating on overflow.
    #[inline]
    pub(crate) fn as_micros(self) -> u64 {
        (self.0 * 1_000_000.0).round().clamp(0.0, u64::MAX as f64) as u64
    }

    pub(crate) fn from_micros(micros: u64) -> Self {
        Timestamp(micros as f64 / 1_000_000.0)
    }
}

/// A source of wall-clock time.
///
/// Implementations must be monotonic enough for the window arithmetic in
/// [`crate::strategies`] to behave sensibly: readings should never jump
/// backwards by more than clock skew already accounted for by the caller.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> Timestamp;
}

/// The default [`Clock`], backed by the system clock.
///
/// A single epoch/monotonic anchor pair is established once per process
/// (via [`OnceLock`]) and every subsequent reading is derived from a cheap
/// monotonic counter offset from that anchor, avoiding a `SystemTime`
/// syscall on every call in a hot path.
#[derive(Debug, Clone)]
pub struct SystemClock {
    clock: QuantaClock,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            clock: QuantaClock::new(),
        }
    }
}

fn anchor() -> (QuantaInstant, SystemTime) {
    static ANCHOR: OnceLock<(QuantaInstant, SystemTime)> = OnceLock::new();
    *ANCHOR.get_or_init(|| (QuantaClock::new().now(), SystemTime::now()))
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        let (instant0, systime0) = anchor();
        let elapsed = self.clock.now().duration_since(instant0);
        let epoch0 = systime0.duration_since(UNIX_EPOCH).unwrap_or_default();
        Timestamp::from_secs_f64((epoch0 + elapsed).as_secs_f64())
    }
}

/// A [`Clock`] with a manually-advanced reading, used in tests to exercise
/// window-boundary behavior deterministically without sleeping.
#[derive(Debug, Clone)]
pub struct MockClock {
    micros: std::sync::Arc<AtomicU64>,
}

impl MockClock {
    /// Creates a clock starting at the given number of seconds since the
    /// epoch.
    pub fn new(initial_secs: f64) -> Self {
        Self {
            micros: std::sync::Arc::new(AtomicU64::new(Timestamp::from_secs_f64(initial_secs).as_micros())),
        }
    }

    /// Advances the clock forward by the given number of seconds.
    pub fn advance(&self, secs: f64) {
        let delta = (secs * 1_000_000.0).round() as u64;
        self.micros.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute number of seconds since the epoch.
    pub fn set(&self, secs: f64) {
        self.micros
            .store(Timestamp::from_secs_f64(secs).as_micros(), Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::SeqCst))
    }
}
