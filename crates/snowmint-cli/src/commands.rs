use std::{io::Write, thread, time::Duration};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use snowmint::{Generator, MonotonicClock, SnowflakeId, SystemClock, TimeSource};

use crate::config::{CliConfig, ClockKind, Command};

/// Runs the configured command, writing its output to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match config.clock {
        ClockKind::System => {
            let generator = Generator::with_time_source(config.generator, SystemClock);
            run_with(&generator, &config.command, out)
        }
        ClockKind::Monotonic => {
            let clock = MonotonicClock::new().context("failed to start monotonic clock")?;
            let generator = Generator::with_time_source(config.generator, clock);
            run_with(&generator, &config.command, out)
        }
    }
}

fn run_with<T: TimeSource>(
    generator: &Generator<T>,
    command: &Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Mint { count, max_retries } => {
            tracing::info!(
                instance_id = generator.instance_id(),
                count,
                "minting identifiers"
            );
            // A fixed clock never advances, so waiting out a rate limit is
            // pointless.
            let max_retries = if generator.is_fixed_clock() { 0 } else { *max_retries };
            for _ in 0..*count {
                let id = mint_with_retries(generator, max_retries)?;
                writeln!(out, "{id}")?;
            }
        }
        Command::Inspect { ids, layout } => {
            for &raw in ids {
                let id = SnowflakeId::from_raw(raw);
                let created = generator.timestamp_of(id);
                let unix_ms = snowmint::unix_millis(created);
                let instant = DateTime::<Utc>::from(created).to_rfc3339_opts(SecondsFormat::Millis, true);
                writeln!(
                    out,
                    "{id}\ttimestamp_ms={unix_ms}\tcreated={instant}\tinstance_id={}\tsequence={}",
                    id.instance_id(),
                    id.sequence()
                )?;
                if *layout {
                    writeln!(out, "{id:?}")?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Mints one identifier, sleeping a millisecond after each rate limit.
fn mint_with_retries<T: TimeSource>(
    generator: &Generator<T>,
    max_retries: u32,
) -> anyhow::Result<SnowflakeId> {
    let mut retries = 0;
    loop {
        match generator.mint() {
            Ok(id) => return Ok(id),
            Err(e) if e.is_rate_limited() && retries < max_retries => {
                retries += 1;
                tracing::debug!(retries, "rate limited, retrying after a millisecond");
                thread::sleep(Duration::from_millis(1));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to mint after {retries} retries"));
            }
        }
    }
}
