//! Reference in-memory storage backend.
//!
//! Implements all three capability traits (§4.B) behind one mutex per
//! capability table, held only for the duration of the arithmetic on a
//! single key, per this crate's shared-resource policy (§5). This is the
//! backend the `memory://` scheme (§6) addresses, and the one every test
//! in this crate runs against.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::clock::Timestamp;
use crate::error::StorageError;

use super::{CounterStore, MovingWindowStore, SlidingWindowSample, SlidingWindowStore};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: u64,
    expires_at: f64,
}

#[derive(Debug, Clone, Copy)]
struct SlidingBucket {
    /// Epoch start of the bucket this entry currently calls "current".
    bucket_start: f64,
    current_count: u64,
    previous_count: u64,
}

/// An in-process storage backend implementing the counter, moving-window,
/// and sliding-window capabilities.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    counters: Mutex<HashMap<String, CounterEntry>>,
    logs: Mutex<HashMap<String, VecDeque<f64>>>,
    sliding: Mutex<HashMap<String, SlidingBucket>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryStorage {
    fn incr(
        &self,
        key: &str,
        expiry_seconds: u64,
        amount: u64,
        elastic_expiry: bool,
        now: Timestamp,
    ) -> Result<u64, StorageError> {
        let now = now.as_secs_f64();
        let expiry = expiry_seconds as f64;
        let mut table = self.counters.lock().expect("counter table poisoned");
        let new_value = match table.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.value += amount;
                if elastic_expiry {
                    entry.expires_at = now + expiry;
                }
                entry.value
            }
            _ => {
                table.insert(
                    key.to_string(),
                    CounterEntry {
                        value: amount,
                        expires_at: now + expiry,
                    },
                );
                amount
            }
        };
        Ok(new_value)
    }

    fn get(&self, key: &str, now: Timestamp) -> Result<u64, StorageError> {
        let now = now.as_secs_f64();
        let table = self.counters.lock().expect("counter table poisoned");
        Ok(table
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value)
            .unwrap_or(0))
    }

    fn get_expiry(&self, key: &str) -> Result<Option<Timestamp>, StorageError> {
        let table = self.counters.lock().expect("counter table poisoned");
        Ok(table.get(key).map(|entry| Timestamp::from_secs_f64(entry.expires_at)))
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.counters
            .lock()
            .expect("counter table poisoned")
            .remove(key);
        Ok(())
    }
}

fn prune(log: &mut VecDeque<f64>, cutoff: f64) {
    while matches!(log.front(), Some(&oldest) if oldest <= cutoff) {
        log.pop_front();
    }
}

impl MovingWindowStore for MemoryStorage {
    fn acquire_entry(
        &self,
        key: &str,
        limit_amount: u64,
        expiry_seconds: u64,
        now: Timestamp,
    ) -> Result<(bool, Timestamp), StorageError> {
        let now_secs = now.as_secs_f64();
        let cutoff = now_secs - expiry_seconds as f64;
        let mut table = self.logs.lock().expect("log table poisoned");
        let log = table.entry(key.to_string()).or_default();
        prune(log, cutoff);

        let acquired = (log.len() as u64) < limit_amount;
        if acquired {
            log.push_back(now_secs);
        }
        let oldest = log
            .front()
            .copied()
            .map(Timestamp::from_secs_f64)
            .unwrap_or(now);
        Ok((acquired, oldest))
    }

    fn get_moving_window(
        &self,
        key: &str,
        expiry_seconds: u64,
        now: Timestamp,
    ) -> Result<(u64, Timestamp), StorageError> {
        let now_secs = now.as_secs_f64();
        let cutoff = now_secs - expiry_seconds as f64;
        let mut table = self.logs.lock().expect("log table poisoned");
        let Some(log) = table.get_mut(key) else {
            return Ok((0, now));
        };
        prune(log, cutoff);
        let oldest = log
            .front()
            .copied()
            .map(Timestamp::from_secs_f64)
            .unwrap_or(now);
        Ok((log.len() as u64, oldest))
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.logs.lock().expect("log table poisoned").remove(key);
        Ok(())
    }
}

/// Resolves the (previous, current) counts a raw stored bucket implies for
/// a window starting at `current_start`, without requiring a write-back:
/// the rotation is a pure function of `current_start` relative to whatever
/// epoch the stored record was last written under.
fn resolve_counts(bucket: Option<&SlidingBucket>, current_start: f64, window_seconds: f64) -> (u64, u64) {
    match bucket {
        None => (0, 0),
        Some(bucket) if bucket.bucket_start == current_start => {
            (bucket.previous_count, bucket.current_count)
        }
        Some(bucket) if bucket.bucket_start == current_start - window_seconds => {
            (bucket.current_count, 0)
        }
        Some(_) => (0, 0),
    }
}

fn weighted_usage(previous_count: u64, current_count: u64, elapsed: f64, window_seconds: f64) -> f64 {
    let weight = ((window_seconds - elapsed) / window_seconds).clamp(0.0, 1.0);
    previous_count as f64 * weight + current_count as f64
}

impl SlidingWindowStore for MemoryStorage {
    fn acquire_sliding_window(
        &self,
        key: &str,
        limit_amount: u64,
        window_seconds: u64,
        now: Timestamp,
    ) -> Result<(bool, SlidingWindowSample), StorageError> {
        let ws = window_seconds as f64;
        let now_secs = now.as_secs_f64();
        let current_start = (now_secs / ws).floor() * ws;
        let elapsed = now_secs - current_start;

        let mut table = self.sliding.lock().expect("sliding table poisoned");
        let (previous_count, current_count) =
            resolve_counts(table.get(key), current_start, ws);

        let usage = weighted_usage(previous_count, current_count, elapsed, ws);
        let admitted = usage + 1.0 <= limit_amount as f64;
        let new_current = if admitted { current_count + 1 } else { current_count };

        table.insert(
            key.to_string(),
            SlidingBucket {
                bucket_start: current_start,
                current_count: new_current,
                previous_count,
            },
        );

        Ok((
            admitted,
            SlidingWindowSample {
                previous_count,
                current_count: new_current,
            },
        ))
    }

    fn get_sliding_window(
        &self,
        key: &str,
        window_seconds: u64,
        now: Timestamp,
    ) -> Result<SlidingWindowSample, StorageError> {
        let ws = window_seconds as f64;
        let now_secs = now.as_secs_f64();
        let current_start = (now_secs / ws).floor() * ws;

        let table = self.sliding.lock().expect("sliding table poisoned");
        let (previous_count, current_count) = resolve_counts(table.get(key), current_start, ws);
        Ok(SlidingWindowSample {
            previous_count,
            current_count,
        })
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.sliding.lock().expect("sliding table poisoned").remove(key);
        Ok(())
    }
}
