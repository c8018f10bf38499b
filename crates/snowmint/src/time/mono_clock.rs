use std::{
    io,
    sync::Arc,
    thread,
    time::{Duration, Instant, SystemTime},
};

use portable_atomic::{AtomicU64, Ordering};

use crate::time::{TimeSource, unix_millis};

/// Elapsed milliseconds published by the ticker thread.
#[derive(Debug)]
struct Ticker {
    elapsed: AtomicU64,
}

/// A time source that cannot move backward.
///
/// The wall clock is read once, at construction, to anchor the clock to the
/// Unix epoch. From then on time advances with a monotonic [`Instant`], so
/// NTP steps or manual clock changes do not affect the readings.
///
/// A background thread publishes the elapsed milliseconds into an atomic once
/// per millisecond, keeping syscalls off the minting path. The thread only
/// holds a weak reference and exits once every clone of the clock has been
/// dropped.
///
/// # Example
///
/// ```
/// use snowmint::{MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::new().unwrap();
/// let first = clock.current_millis();
/// std::thread::sleep(std::time::Duration::from_millis(3));
/// assert!(clock.current_millis() >= first);
/// ```
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticker: Arc<Ticker>,
    anchor: u64, // unix millis at construction
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time and starts its
    /// ticker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticker thread cannot be spawned.
    pub fn new() -> io::Result<Self> {
        let start = Instant::now();
        let anchor = unix_millis(SystemTime::now());

        let ticker = Arc::new(Ticker {
            elapsed: AtomicU64::new(0),
        });

        let weak = Arc::downgrade(&ticker);
        thread::Builder::new()
            .name("snowmint-ticker".into())
            .spawn(move || {
                let mut tick = 0;

                loop {
                    let target = start + Duration::from_millis(tick);
                    let now = Instant::now();
                    if now < target {
                        thread::sleep(target - now);
                    }

                    let Some(ticker) = weak.upgrade() else {
                        break;
                    };

                    let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    ticker.elapsed.store(now_ms, Ordering::Release);

                    // Next tick is aligned to the millisecond after the one
                    // just published, not to the one we overslept.
                    tick = now_ms + 1;
                }
            })?;

        Ok(Self { ticker, anchor })
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.anchor + self.ticker.elapsed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_near_wall_clock() {
        let before = unix_millis(SystemTime::now());
        let clock = MonotonicClock::new().unwrap();
        let after = unix_millis(SystemTime::now());
        let now = clock.current_millis();
        assert!(now >= before);
        assert!(now <= after + 1_000);
    }

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new().unwrap();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_over_time() {
        let clock = MonotonicClock::new().unwrap();
        let first = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > first);
    }

    #[test]
    fn ticker_released_when_clock_dropped() {
        let clock = MonotonicClock::new().unwrap();
        let weak = Arc::downgrade(&clock.ticker);
        let copy = clock.clone();
        drop(clock);
        assert!(weak.upgrade().is_some());
        drop(copy);

        // The ticker thread briefly holds an upgraded reference while it
        // publishes a tick.
        let deadline = Instant::now() + Duration::from_secs(5);
        while weak.upgrade().is_some() {
            assert!(Instant::now() < deadline, "ticker thread kept the clock alive");
            thread::sleep(Duration::from_millis(1));
        }
    }
}
