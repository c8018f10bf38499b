use core::fmt;

/// A 64-bit Snowflake identifier.
///
/// - 42 bits timestamp (ms since the generator's epoch)
/// - 10 bits instance id
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63             22 21              12 11             0
///              +----------------+------------------+---------------+
///  Field:      | timestamp (42) | instance id (10) | sequence (12) |
///              +----------------+------------------+---------------+
///              |<----- MSB ----------- 64 bits ---------- LSB ---->|
/// ```
///
/// Identifiers compare by their raw value, so ordering follows the timestamp
/// first, then the instance id, then the sequence.
///
/// # Example
///
/// ```
/// use snowmint::SnowflakeId;
///
/// let id = SnowflakeId::from(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.instance_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(u64::from(id), (1000 << 22) | (2 << 12) | 1);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for the 42-bit timestamp field. Occupies bits 22 through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << 42) - 1;

    /// Bitmask for the 10-bit instance id field. Occupies bits 12 through 21.
    pub const INSTANCE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for the 12-bit sequence field. Occupies bits 0 through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the instance id to its position (bit 12).
    pub const INSTANCE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Number of sequence values a generator hands out per millisecond.
    ///
    /// The all-ones sequence value marks an exhausted millisecond and is never
    /// minted, so sequences run from `0` through `SEQUENCE_LIMIT - 1`.
    pub const SEQUENCE_LIMIT: u64 = Self::SEQUENCE_MASK;

    /// Packs the three fields into an identifier. Each field is masked to its
    /// width, so oversized inputs are truncated rather than spilling into a
    /// neighbouring field.
    pub const fn from(timestamp: u64, instance_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let instance_id = (instance_id & Self::INSTANCE_ID_MASK) << Self::INSTANCE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | instance_id | sequence,
        }
    }

    /// Like [`Self::from`], but asserts in debug builds that every field fits.
    pub fn from_components(timestamp: u64, instance_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(instance_id <= Self::INSTANCE_ID_MASK, "instance_id overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::from(timestamp, instance_id, sequence)
    }

    /// Wraps a raw packed value.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the instance id from the packed ID.
    pub const fn instance_id(&self) -> u64 {
        (self.id >> Self::INSTANCE_ID_SHIFT) & Self::INSTANCE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the maximum value of the timestamp field.
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Returns the maximum value of the instance id field.
    pub const fn max_instance_id() -> u64 {
        Self::INSTANCE_ID_MASK
    }

    /// Returns the maximum value of the sequence field.
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns true if another identifier can follow this one within the same
    /// millisecond.
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence() + 1 < Self::SEQUENCE_LIMIT
    }

    /// Returns the identifier that follows this one within the same
    /// millisecond.
    pub fn increment_sequence(&self) -> Self {
        debug_assert!(self.has_sequence_room(), "sequence exhausted");
        Self::from_raw(self.id + 1)
    }

    /// Returns the first identifier of another millisecond, keeping the
    /// instance id.
    pub fn rollover_to_timestamp(&self, timestamp: u64) -> Self {
        Self::from_components(timestamp, self.instance_id(), 0)
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("timestamp", 42, self.timestamp()),
            ("instance_id", 10, self.instance_id()),
            ("sequence", 12, self.sequence()),
        ];

        // Each column fits the widest of its label, decimal and hex rows.
        let widths = fields.map(|(name, bits, value)| {
            let label = format!("{name} ({bits})").len();
            let dec = value.to_string().len();
            let hex = format!("0x{value:x}").len();
            label.max(dec).max(hex) + 2
        });

        fn center(s: impl ToString, width: usize) -> String {
            let s = s.to_string();
            let pad = width.saturating_sub(s.len());
            let left = pad / 2;
            format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
        }

        fn border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
            write!(f, "        +")?;
            for &w in widths {
                write!(f, "{}+", "-".repeat(w))?;
            }
            writeln!(f)
        }

        writeln!(f, "SnowflakeId {{")?;
        writeln!(f, "    raw id     : 0x{:016x} ({})", self.id, self.id)?;
        writeln!(f, "    padded     : {}", self.to_padded_string())?;
        writeln!(f, "    layout     :")?;
        border(f, &widths)?;
        write!(f, "        |")?;
        for ((name, bits, _), w) in fields.iter().zip(widths) {
            write!(f, "{}|", center(format!("{name} ({bits})"), w))?;
        }
        writeln!(f)?;
        border(f, &widths)?;
        write!(f, "        |")?;
        for ((_, _, value), w) in fields.iter().zip(widths) {
            write!(f, "{}|", center(value, w))?;
        }
        writeln!(f)?;
        write!(f, "        |")?;
        for ((_, _, value), w) in fields.iter().zip(widths) {
            write!(f, "{}|", center(format!("0x{value:x}"), w))?;
        }
        writeln!(f)?;
        border(f, &widths)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_and_bounds() {
        let ts = SnowflakeId::max_timestamp();
        let iid = SnowflakeId::max_instance_id();
        let seq = SnowflakeId::max_sequence();

        let id = SnowflakeId::from(ts, iid, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.instance_id(), iid);
        assert_eq!(id.sequence(), seq);
        assert_eq!(id.to_raw(), u64::MAX);
        assert_eq!(SnowflakeId::from_components(ts, iid, seq), id);
    }

    #[test]
    fn layout_matches_shifts() {
        let id = SnowflakeId::from(1_700_000_000_000, 7, 1);
        assert_eq!(id.to_raw(), (1_700_000_000_000 << 22) | (7 << 12) | 1);
        let back: SnowflakeId = u64::from(id).into();
        assert_eq!(back, id);
    }

    #[test]
    fn from_truncates_each_field() {
        let id = SnowflakeId::from(SnowflakeId::TIMESTAMP_MASK + 2, 1024 + 3, 4096 + 5);
        assert_eq!(id.timestamp(), 1);
        assert_eq!(id.instance_id(), 3);
        assert_eq!(id.sequence(), 5);
    }

    #[test]
    fn ordering_follows_timestamp_first() {
        let early = SnowflakeId::from(10, 1023, 4094);
        let late = SnowflakeId::from(11, 0, 0);
        assert!(early < late);
        assert!(SnowflakeId::from(10, 3, 1) < SnowflakeId::from(10, 3, 2));
    }

    #[test]
    fn sequence_room_stops_before_limit() {
        let id = SnowflakeId::from(5, 1, SnowflakeId::SEQUENCE_LIMIT - 2);
        assert!(id.has_sequence_room());
        let last = id.increment_sequence();
        assert_eq!(last.sequence(), SnowflakeId::SEQUENCE_LIMIT - 1);
        assert_eq!(last.timestamp(), 5);
        assert!(!last.has_sequence_room());

        let next = last.rollover_to_timestamp(6);
        assert_eq!(next.timestamp(), 6);
        assert_eq!(next.instance_id(), 1);
        assert_eq!(next.sequence(), 0);
    }

    #[test]
    fn display_and_padding() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.to_padded_string(), "00000000000000000042");
    }

    #[test]
    fn debug_draws_layout() {
        let rendered = format!("{:?}", SnowflakeId::from(1, 2, 3));
        assert!(rendered.starts_with("SnowflakeId {"));
        assert!(rendered.contains("timestamp (42)"));
        assert!(rendered.contains("instance_id (10)"));
        assert!(rendered.contains("sequence (12)"));
        assert!(rendered.ends_with('}'));
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        SnowflakeId::from_components(SnowflakeId::max_timestamp() + 1, 0, 0);
    }

    #[test]
    #[should_panic(expected = "instance_id overflow")]
    fn instance_id_overflow_panics() {
        SnowflakeId::from_components(0, SnowflakeId::max_instance_id() + 1, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        SnowflakeId::from_components(0, 0, SnowflakeId::max_sequence() + 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_raw_integer() {
        let id = SnowflakeId::from(1, 2, 3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
