use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::GeneratorConfig,
    error::{Error, Result},
    generator::Mutex,
    id::SnowflakeId,
    time::{SystemClock, TimeSource, unix_millis},
};

/// A lock-based Snowflake ID generator that fails fast when a millisecond's
/// sequence space runs out.
///
/// The last minted identifier is kept behind a mutex, which covers the whole
/// read-modify-write of each mint: a handful of comparisons and bit
/// operations, no I/O and no waiting on the clock. Every call therefore
/// either returns an identifier or [`Error::RateLimitExceeded`] right away.
///
/// ## Sequence rules
/// - The first identifier of a millisecond has sequence `0`.
/// - Each further identifier in the same millisecond increments it.
/// - Sequences `0..=4094` are issued; the 4096th call within one millisecond
///   and every call after it fail until a later timestamp arrives.
/// - A timestamp later than every one seen so far starts over at `0`.
/// - Earlier timestamps draw from a separate backfill sequence that begins
///   above every sequence already issued before the latest timestamp and is
///   never reset. Once it is used up, earlier timestamps are rate limited.
///
/// No two identifiers from one generator are ever equal, whatever order the
/// timestamps arrive in. Ordering is another matter: backward clock jumps are
/// not corrected, so keep the time source non-decreasing (see
/// [`MonotonicClock`]) if identifiers must follow creation order.
///
/// ## Example
/// ```
/// use snowmint::{Generator, GeneratorConfig};
///
/// let generator = Generator::new(GeneratorConfig::default().with_instance_id(1));
///
/// let id = loop {
///     match generator.mint() {
///         Ok(id) => break id,
///         Err(e) if e.is_rate_limited() => std::thread::yield_now(),
///         Err(e) => panic!("generator error: {e}"),
///     }
/// };
/// assert_eq!(id.instance_id(), 1);
/// ```
///
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Debug)]
pub struct Generator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<SequenceState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<SequenceState>,
    instance_id: u16,
    fixed_clock: Option<u64>,
    epoch: Duration,
    epoch_millis: u64,
    time: T,
}

impl Generator<SystemClock> {
    /// Creates a generator that reads the system clock.
    ///
    /// Never fails: an unset instance id is replaced by a random one and an
    /// oversized one is truncated to 10 bits.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_time_source(config, SystemClock)
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator that reads `time` whenever no fixed clock is
    /// configured.
    ///
    /// # Example
    /// ```
    /// use snowmint::{Generator, GeneratorConfig, MonotonicClock};
    ///
    /// let clock = MonotonicClock::new().unwrap();
    /// let generator = Generator::with_time_source(GeneratorConfig::default(), clock);
    /// assert!(generator.instance_id() <= 1023);
    /// ```
    pub fn with_time_source(config: GeneratorConfig, time: T) -> Self {
        let instance_id = resolve_instance_id(config.instance_id);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(SequenceState::default())),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(SequenceState::default()),
            instance_id,
            fixed_clock: config.fixed_clock.map(unix_millis),
            epoch: config.epoch,
            epoch_millis: u64::try_from(config.epoch.as_millis()).unwrap_or(u64::MAX),
            time,
        }
    }

    /// The 10-bit instance id embedded in every identifier.
    pub const fn instance_id(&self) -> u16 {
        self.instance_id
    }

    /// Offset from the Unix epoch that timestamps count from.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    /// Returns true if [`Self::mint`] always uses a configured fixed instant.
    pub const fn is_fixed_clock(&self) -> bool {
        self.fixed_clock.is_some()
    }

    /// Mints an identifier for the current time.
    ///
    /// "Current" is the fixed clock when one is configured, otherwise the
    /// generator's time source.
    ///
    /// # Errors
    /// - [`Error::RateLimitExceeded`] when the millisecond is exhausted. Retry
    ///   after the clock advances.
    /// - [`Error::LockPoisoned`] if a thread panicked while holding the lock
    ///   (std mutex builds only).
    pub fn mint(&self) -> Result<SnowflakeId> {
        let now = match self.fixed_clock {
            Some(millis) => millis,
            None => self.time.current_millis(),
        };
        self.mint_millis(now)
    }

    /// Mints an identifier for an explicit instant, for deterministic tests
    /// and historical backfill.
    ///
    /// Any instant is accepted, including ones at or before earlier calls.
    /// Instants before the epoch are clamped to timestamp `0`; instants more
    /// than 2^42 ms after it wrap around.
    ///
    /// # Errors
    /// Same as [`Self::mint`].
    ///
    /// # Example
    /// ```
    /// use std::time::{Duration, UNIX_EPOCH};
    /// use snowmint::{Generator, GeneratorConfig};
    ///
    /// let generator = Generator::new(GeneratorConfig::default().with_instance_id(3));
    /// let at = UNIX_EPOCH + Duration::from_millis(1_600_000_000_123);
    ///
    /// let id = generator.mint_at(at).unwrap();
    /// assert_eq!(id.timestamp(), 1_600_000_000_123);
    /// assert_eq!(generator.timestamp_of(id), at);
    /// ```
    pub fn mint_at(&self, at: SystemTime) -> Result<SnowflakeId> {
        self.mint_millis(unix_millis(at))
    }

    /// Recovers the creation instant of `id`, at millisecond precision.
    ///
    /// Accepts a raw `u64` or a [`SnowflakeId`]. The result is only
    /// meaningful for identifiers minted with the same epoch.
    pub fn timestamp_of(&self, id: impl Into<SnowflakeId>) -> SystemTime {
        let id = id.into();
        UNIX_EPOCH + self.epoch + Duration::from_millis(id.timestamp())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn mint_millis(&self, unix_ms: u64) -> Result<SnowflakeId> {
        let timestamp = unix_ms.saturating_sub(self.epoch_millis) & SnowflakeId::TIMESTAMP_MASK;

        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let latest = state.latest;
        match latest {
            None => {
                let id = SnowflakeId::from_components(timestamp, u64::from(self.instance_id), 0);
                state.latest = Some(id);
                Ok(id)
            }
            Some(latest) if timestamp > latest.timestamp() => {
                // Everything issued at `latest`'s millisecond now sits below
                // the high-water mark.
                state.backfill = state.backfill.max(latest.sequence() + 1);
                let id = latest.rollover_to_timestamp(timestamp);
                state.latest = Some(id);
                Ok(id)
            }
            Some(latest) if timestamp == latest.timestamp() => {
                if !latest.has_sequence_room() {
                    return Err(Self::cold_rate_limited(timestamp));
                }
                let id = latest.increment_sequence();
                state.latest = Some(id);
                Ok(id)
            }
            Some(_) => {
                if state.backfill >= SnowflakeId::SEQUENCE_LIMIT {
                    return Err(Self::cold_rate_limited(timestamp));
                }
                let id = SnowflakeId::from_components(
                    timestamp,
                    u64::from(self.instance_id),
                    state.backfill,
                );
                state.backfill += 1;
                Ok(id)
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_rate_limited(timestamp: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::debug!(timestamp, "sequence exhausted for this millisecond");
        Error::RateLimitExceeded { timestamp }
    }
}

/// Sequence bookkeeping shared by every mint.
#[derive(Clone, Copy, Debug, Default)]
struct SequenceState {
    /// Last identifier minted at the highest timestamp seen so far.
    latest: Option<SnowflakeId>,
    /// Next sequence for timestamps below `latest`'s. Always greater than any
    /// sequence already issued at those timestamps.
    backfill: u64,
}

fn resolve_instance_id(requested: Option<u16>) -> u16 {
    const MAX: u16 = SnowflakeId::INSTANCE_ID_MASK as u16;

    match requested {
        Some(requested) => {
            let instance_id = requested & MAX;
            #[cfg(feature = "tracing")]
            if instance_id != requested {
                tracing::warn!(requested, instance_id, "instance id wider than 10 bits, truncated");
            }
            instance_id
        }
        None => {
            let instance_id = rand::rng().random_range(0..=MAX);
            #[cfg(feature = "tracing")]
            tracing::debug!(instance_id, "no instance id configured, picked one at random");
            instance_id
        }
    }
}
