mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig};
use std::io::{self, BufWriter};
use telemetry::init_telemetry;

// Using mimalloc for better allocation throughput, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    tracing::debug!(?config, "resolved configuration");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    commands::run(&config, &mut out)
}
