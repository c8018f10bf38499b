use anyhow::bail;
use clap::{Parser, Subcommand};
use snowmint::{GeneratorConfig, SnowflakeId};
use std::time::{Duration, UNIX_EPOCH};

/// Command-line and environment configuration for the `snowmint` binary.
///
/// Every global flag can also be set through the environment variable named
/// in its help text, or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowmint",
    version,
    about = "Mint and inspect time-sortable 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Instance id embedded in minted IDs, in [0, 1023].
    ///
    /// Must be unique among generators running at the same time. When unset
    /// a random id is picked, which does not guarantee uniqueness.
    ///
    /// Environment variable: `SNOWMINT_INSTANCE_ID`
    #[arg(long, global = true, env = "SNOWMINT_INSTANCE_ID")]
    pub instance_id: Option<u16>,

    /// Mint every ID as of this Unix timestamp (milliseconds) instead of the
    /// current time.
    ///
    /// Environment variable: `SNOWMINT_FIXED_CLOCK_MS`
    #[arg(long, global = true, env = "SNOWMINT_FIXED_CLOCK_MS")]
    pub fixed_clock_ms: Option<u64>,

    /// Unix timestamp (milliseconds) that the timestamp field counts from.
    ///
    /// Environment variable: `SNOWMINT_EPOCH_MS`
    #[arg(long, global = true, env = "SNOWMINT_EPOCH_MS", default_value_t = 0)]
    pub epoch_ms: u64,

    /// Read time from a monotonic clock that ignores wall-clock adjustments
    /// made after startup.
    ///
    /// Environment variable: `SNOWMINT_MONOTONIC`
    #[arg(long, global = true, env = "SNOWMINT_MONOTONIC", default_value_t = false)]
    pub monotonic: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint new IDs and print one per line.
    Mint {
        /// Number of IDs to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Retries per ID when a millisecond is exhausted, one millisecond
        /// apart.
        #[arg(long, default_value_t = 1_000)]
        max_retries: u32,
    },
    /// Decode IDs into their timestamp, instance id and sequence.
    Inspect {
        /// Raw IDs as unsigned decimal integers.
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Also draw the bit layout of each ID.
        #[arg(long, default_value_t = false)]
        layout: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockKind {
    System,
    Monotonic,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub generator: GeneratorConfig,
    pub clock: ClockKind,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let max_instance_id = SnowflakeId::max_instance_id();

        let mut generator = GeneratorConfig::default().with_epoch(Duration::from_millis(args.epoch_ms));

        if let Some(instance_id) = args.instance_id {
            if u64::from(instance_id) > max_instance_id {
                bail!("SNOWMINT_INSTANCE_ID ({instance_id}) exceeds the instance id space (max = {max_instance_id})");
            }
            generator = generator.with_instance_id(instance_id);
        }

        if let Some(fixed_ms) = args.fixed_clock_ms {
            if args.monotonic {
                bail!("SNOWMINT_FIXED_CLOCK_MS and SNOWMINT_MONOTONIC are mutually exclusive");
            }
            if fixed_ms < args.epoch_ms {
                bail!("SNOWMINT_FIXED_CLOCK_MS ({fixed_ms}) is before SNOWMINT_EPOCH_MS ({})", args.epoch_ms);
            }
            generator = generator.with_fixed_clock(UNIX_EPOCH + Duration::from_millis(fixed_ms));
        }

        if let Command::Mint { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        let clock = if args.monotonic {
            ClockKind::Monotonic
        } else {
            ClockKind::System
        };

        Ok(Self {
            generator,
            clock,
            command: args.command,
        })
    }
}
