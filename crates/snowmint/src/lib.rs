//! Time-sortable 64-bit Snowflake identifiers.
//!
//! A [`SnowflakeId`] packs a 42-bit millisecond timestamp, a 10-bit instance
//! id and a 12-bit sequence into one `u64`:
//!
//! ```text
//!  Bit Index:  63             22 21              12 11             0
//!              +----------------+------------------+---------------+
//!  Field:      | timestamp (42) | instance id (10) | sequence (12) |
//!              +----------------+------------------+---------------+
//!              |<----- MSB ----------- 64 bits ---------- LSB ---->|
//! ```
//!
//! A [`Generator`] mints identifiers under a short mutex and fails fast with
//! [`Error::RateLimitExceeded`] when a millisecond's sequence space is used
//! up. Retrying is left to the caller.
//!
//! ```
//! use std::time::{Duration, UNIX_EPOCH};
//! use snowmint::{Generator, GeneratorConfig};
//!
//! let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
//! let generator = Generator::new(GeneratorConfig::default().with_instance_id(7).with_fixed_clock(at));
//!
//! let id = generator.mint().unwrap();
//! assert_eq!(id.to_raw(), (1_700_000_000_000 << 22) | (7 << 12));
//! assert_eq!(generator.timestamp_of(id), at);
//! ```
//!
//! The caller is responsible for assigning distinct instance ids to
//! concurrently running generators. When no instance id is configured a random
//! one is picked, which makes collisions unlikely but not impossible.

mod config;
mod error;
mod generator;
mod id;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
