use std::time::{Duration, SystemTime};

use crate::time::UNIX_EPOCH_OFFSET;

/// Construction options for a [`Generator`].
///
/// All fields are optional:
///
/// - `instance_id`: the 10-bit id embedded in every identifier. Left unset, a
///   random value is drawn when the generator is built. Random ids only make
///   collisions unlikely; deployments that need a guarantee must hand out
///   distinct ids themselves. Values above 1023 are truncated to their low 10
///   bits.
/// - `fixed_clock`: when set, every mint uses this instant instead of the
///   generator's time source. Useful for tests and for minting identifiers as
///   of a past instant.
/// - `epoch`: offset from the Unix epoch that the timestamp field counts
///   from. Defaults to the Unix epoch itself.
///
/// # Example
///
/// ```
/// use std::time::{Duration, UNIX_EPOCH};
/// use snowmint::{DISCORD_EPOCH, GeneratorConfig};
///
/// let config = GeneratorConfig::default()
///     .with_instance_id(7)
///     .with_epoch(DISCORD_EPOCH)
///     .with_fixed_clock(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
/// assert_eq!(config.instance_id, Some(7));
/// ```
///
/// [`Generator`]: crate::Generator
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Instance id embedded in every identifier; random when unset.
    pub instance_id: Option<u16>,
    /// Instant used by every [`Generator::mint`] call instead of the time
    /// source.
    ///
    /// [`Generator::mint`]: crate::Generator::mint
    pub fixed_clock: Option<SystemTime>,
    /// Offset from the Unix epoch that timestamps count from.
    pub epoch: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instance_id: None,
            fixed_clock: None,
            epoch: UNIX_EPOCH_OFFSET,
        }
    }
}

impl GeneratorConfig {
    /// Sets the instance id. Values above 1023 are truncated to 10 bits.
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: u16) -> Self {
        self.instance_id = Some(instance_id);
        self
    }

    /// Pins every mint to `at`.
    #[must_use]
    pub fn with_fixed_clock(mut self, at: SystemTime) -> Self {
        self.fixed_clock = Some(at);
        self
    }

    /// Sets the epoch offset, e.g. [`TWITTER_EPOCH`] or [`DISCORD_EPOCH`].
    ///
    /// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
    /// [`DISCORD_EPOCH`]: crate::DISCORD_EPOCH
    #[must_use]
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }
}
