//! Error taxonomy.
//!
//! Storage backends report [`StorageError`]; strategies and the limit
//! parser report [`Error`], which wraps a [`StorageError`] alongside the
//! failure modes that belong to the core itself.

use thiserror::Error;

/// Errors produced by a storage capability implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached, or the operation timed out.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A CAS-emulation loop exceeded its bounded retry budget.
    #[error("concurrency budget exhausted after {0} attempts")]
    ConcurrencyExhausted(usize),
}

/// Errors surfaced to callers of a [`crate::strategies::Strategy`].
#[derive(Debug, Error)]
pub enum Error {
    /// The textual limit expression could not be parsed.
    #[error("malformed limit expression: {0}")]
    Parse(String),

    /// The backend could not be reached, or the operation timed out.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The configured storage does not support a capability this strategy
    /// requires.
    ///
    /// Strategies in this crate are generic over the capability trait they
    /// need, so a mismatch here is normally a compile error rather than a
    /// runtime one; this variant exists for dynamically-dispatched backend
    /// selection built on top of this crate.
    #[error("storage does not support the capability required by this strategy: {0}")]
    CapabilityMismatch(&'static str),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => Error::StorageUnavailable(msg),
            StorageError::ConcurrencyExhausted(attempts) => Error::StorageUnavailable(format!(
                "concurrency budget exhausted after {attempts} attempts"
            )),
        }
    }
}
