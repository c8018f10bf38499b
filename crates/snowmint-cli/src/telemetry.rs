//! Console logging for the `snowmint` binary.
//!
//! Events go to stderr so that minted IDs on stdout stay pipeable. The filter
//! defaults to `info` and can be overridden with `RUST_LOG`, e.g.
//! `RUST_LOG=snowmint=trace` to see every mint.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
