//! # ratelimit-core
//!
//! `ratelimit-core` is a strategy-driven rate limiting library: textual
//! limit expressions (`10/minute`), pluggable storage backends, and three
//! window algorithms built on a small set of storage capability traits.
//!
//! ## Core Philosophy
//!
//! A [`Strategy`] does not own its state. It is generic over the storage
//! capability it needs — [`CounterStore`], [`MovingWindowStore`], or
//! [`SlidingWindowStore`] — so pairing a strategy with a backend that lacks
//! the capability it needs is a compile error, not a runtime surprise.
//! [`MemoryStorage`] implements all three and is the reference backend used
//! throughout this crate's own tests.
//!
//! ## Key Concepts
//!
//! * **Limits as text**: [`parse`] turns `"10/minute"` or `"5 per 3 seconds"`
//!   into a [`Limit`], the value every strategy keys its storage off of.
//! * **Capability traits, not one big trait**: a backend only implements
//!   what it can support atomically.
//! * **Explicit clock reads**: every operation reads [`Clock::now`] exactly
//!   once and threads that single [`Timestamp`] through every storage call,
//!   so a strategy's admission decision is a pure function of one instant.
//!
//! ## Example
//!
//! ```rust
//! use ratelimit_core::{parse, FixedWindowStrategy, MemoryStorage, Strategy};
//!
//! let limit = parse("2/second").unwrap();
//! let limiter = FixedWindowStrategy::new(MemoryStorage::new());
//!
//! assert!(limiter.hit(&limit, &["user-42"]).unwrap());
//! assert!(limiter.hit(&limit, &["user-42"]).unwrap());
//! assert!(!limiter.hit(&limit, &["user-42"]).unwrap());
//! ```

mod clock;
mod error;
mod limit;
mod storage;
mod strategies;

pub use clock::{Clock, MockClock, SystemClock, Timestamp};
pub use error::{Error, StorageError};
pub use limit::{Granularity, Limit, parse, parse_many};
pub use storage::{CounterStore, MemoryStorage, MovingWindowStore, SlidingWindowSample, SlidingWindowStore};
pub use strategies::{
    FixedWindowStrategy, MovingWindowStrategy, SlidingWindowCounterStrategy, Strategy, WindowStats,
};
