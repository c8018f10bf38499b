use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unix epoch: Thursday, January 1, 1970 00:00:00 UTC. The default origin of
/// the timestamp field.
pub const UNIX_EPOCH_OFFSET: Duration = Duration::ZERO;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// The generator assumes consecutive readings never decrease. Backward jumps
/// are not detected; they restart the sequence and can order identifiers out
/// of creation order.
///
/// # Example
///
/// ```
/// use snowmint::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Reads `SystemTime::now()` on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_millis(SystemTime::now())
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock {
    millis: u64,
}

impl FixedClock {
    pub fn new(at: SystemTime) -> Self {
        Self {
            millis: unix_millis(at),
        }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }
}

impl TimeSource for FixedClock {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Milliseconds from the Unix epoch to `at`, truncated. Instants before 1970
/// saturate to zero.
pub fn unix_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_millis_truncates_sub_millisecond() {
        let at = UNIX_EPOCH + Duration::from_micros(1_700_000_000_000_999);
        assert_eq!(unix_millis(at), 1_700_000_000_000);
    }

    #[test]
    fn unix_millis_saturates_before_epoch() {
        let at = UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(unix_millis(at), 0);
    }

    #[test]
    fn fixed_clock_never_moves() {
        let clock = FixedClock::new(UNIX_EPOCH + Duration::from_millis(99));
        assert_eq!(clock.current_millis(), 99);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(clock.current_millis(), 99);
        assert_eq!(FixedClock::from_millis(99), clock);
    }

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = unix_millis(SystemTime::now());
        let now = SystemClock.current_millis();
        let after = unix_millis(SystemTime::now());
        assert!(before <= now && now <= after);
    }

    #[test]
    fn shared_references_are_time_sources() {
        let clock = std::sync::Arc::new(FixedClock::from_millis(7));
        assert_eq!(clock.current_millis(), 7);
        assert_eq!((&clock).current_millis(), 7);
    }
}
