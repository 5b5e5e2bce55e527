#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use driftflake::{AnyGenerator, ClockSource, Error, LayoutConfig, WallClock};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Attempts per ID before a strict generator's rollback error is surfaced.
const MAX_ROLLBACK_RETRIES: u32 = 3;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    telemetry::init_logging(args.json)?;
    let config = CliConfig::try_from(args)?;

    tracing::debug!("Starting with config: {:#?}", config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match &config.command {
        Command::Mint { count } => mint(&config.layout, *count, &mut out)?,
        Command::Decode { ids } => decode(&config.layout, ids, &mut out)?,
    }
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

fn mint(layout: &LayoutConfig, count: u64, out: &mut impl Write) -> anyhow::Result<()> {
    let generator = AnyGenerator::new(*layout, WallClock::from_config(layout));
    tracing::info!(
        worker_id = layout.worker_id(),
        method = %layout.method(),
        count,
        "Minting ids"
    );

    for _ in 0..count {
        let id = next_id(&generator)?;
        writeln!(out, "{id}").context("failed to write id")?;
    }
    Ok(())
}

/// Mints one ID, sleeping out short clock rollbacks reported by the strict
/// generator.
fn next_id<C: ClockSource>(generator: &AnyGenerator<C>) -> anyhow::Result<i64> {
    let mut attempts = 0;
    loop {
        match generator.try_next_id() {
            Ok(id) => return Ok(id),
            Err(Error::ClockMovedBackwards(e)) if attempts < MAX_ROLLBACK_RETRIES => {
                attempts += 1;
                tracing::warn!(
                    delta_millis = e.delta_millis,
                    attempts,
                    "Clock moved backwards, waiting before retrying"
                );
                std::thread::sleep(Duration::from_millis(e.delta_millis.unsigned_abs()));
            }
            Err(e) => bail!("failed to mint id: {e}"),
        }
    }
}

fn decode(layout: &LayoutConfig, ids: &[i64], out: &mut impl Write) -> anyhow::Result<()> {
    let codec = layout.codec();
    for &id in ids {
        if id < 0 {
            tracing::warn!(id, "Negative ids are never minted, decoding anyway");
        }
        let decoded = codec.decode(id);
        writeln!(
            out,
            "{id}\ttick={}\tworker_id={}\tseq={}\tunix_millis={}{}",
            decoded.tick,
            decoded.worker_id,
            decoded.seq,
            codec.unix_millis(id),
            if decoded.is_turn_back() {
                "\tturn_back"
            } else {
                ""
            }
        )
        .context("failed to write decoded id")?;
    }
    Ok(())
}
