/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors a [`Generator`] can return.
///
/// [`Error::RateLimitExceeded`] is the only error of the algorithm itself.
/// When the `parking-lot` feature is disabled the generator guards its state
/// with a std mutex, and a poisoned lock surfaces as
/// [`Error::LockPoisoned`].
///
/// [`Generator`]: crate::Generator
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Every sequence value of the millisecond has been handed out.
    ///
    /// Retry once the clock has advanced past `timestamp`.
    #[error("rate limit exceeded at timestamp {timestamp}, retry after a millisecond")]
    RateLimitExceeded {
        /// The 42-bit timestamp field whose sequence space is exhausted.
        timestamp: u64,
    },

    /// A thread panicked while holding the generator lock.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Returns `true` for errors that clear once the clock advances.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
