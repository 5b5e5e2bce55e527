use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use driftflake::{
    DEFAULT_EPOCH_MILLIS, DEFAULT_MAX_DRIFT_COUNT, GeneratorMethod, LayoutConfig, LayoutOptions,
    RESERVED_SEQ_FLOOR,
};

/// Command-line options for the `driftflake` binary.
///
/// Every layout option may come from a flag or an environment variable (a
/// `.env` file in the working directory is loaded first). Defaults match
/// [`LayoutOptions::default`].
#[derive(Parser, Debug, Clone)]
#[command(
    name = "driftflake",
    version,
    about = "Mint and decode Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Origin of the tick field, in Unix milliseconds.
    ///
    /// Environment variable: `DRIFTFLAKE_BASE_EPOCH`
    #[arg(long, env = "DRIFTFLAKE_BASE_EPOCH", global = true, default_value_t = DEFAULT_EPOCH_MILLIS)]
    pub base_epoch: i64,

    /// Worker ID embedded in every minted ID. Must be unique among running
    /// generators sharing a layout.
    ///
    /// Environment variable: `DRIFTFLAKE_WORKER_ID`
    #[arg(long, env = "DRIFTFLAKE_WORKER_ID", global = true, default_value_t = 0)]
    pub worker_id: u16,

    /// Width of the worker ID field (1-15).
    ///
    /// Environment variable: `DRIFTFLAKE_WORKER_ID_BITS`
    #[arg(long, env = "DRIFTFLAKE_WORKER_ID_BITS", global = true, default_value_t = 6)]
    pub worker_id_bits: u8,

    /// Width of the sequence field (3-21). `worker_id_bits + seq_bits` must
    /// not exceed 22.
    ///
    /// Environment variable: `DRIFTFLAKE_SEQ_BITS`
    #[arg(long, env = "DRIFTFLAKE_SEQ_BITS", global = true, default_value_t = 6)]
    pub seq_bits: u8,

    /// Largest sequence value per tick; 0 uses the whole field.
    ///
    /// Environment variable: `DRIFTFLAKE_MAX_SEQ`
    #[arg(long, env = "DRIFTFLAKE_MAX_SEQ", global = true, default_value_t = 0)]
    pub max_seq: u32,

    /// First sequence value of every tick (at least 5).
    ///
    /// Environment variable: `DRIFTFLAKE_MIN_SEQ`
    #[arg(long, env = "DRIFTFLAKE_MIN_SEQ", global = true, default_value_t = RESERVED_SEQ_FLOOR)]
    pub min_seq: u32,

    /// Consecutive ticks the drifting generator may run ahead of the wall
    /// clock before it waits.
    ///
    /// Environment variable: `DRIFTFLAKE_MAX_DRIFT_COUNT`
    #[arg(long, env = "DRIFTFLAKE_MAX_DRIFT_COUNT", global = true, default_value_t = DEFAULT_MAX_DRIFT_COUNT)]
    pub max_drift_count: u32,

    /// Generation algorithm.
    ///
    /// Environment variable: `DRIFTFLAKE_METHOD`
    #[arg(long, env = "DRIFTFLAKE_METHOD", global = true, value_enum, default_value_t = MethodArg::Drifting)]
    pub method: MethodArg,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint IDs and print one per line.
    Mint {
        /// Number of IDs to mint.
        #[arg(short, long, default_value_t = 1)]
        count: u64,
    },
    /// Split IDs into tick, worker ID and sequence.
    Decode {
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    Drifting,
    Strict,
}

impl From<MethodArg> for GeneratorMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Drifting => Self::Drifting,
            MethodArg::Strict => Self::Strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub layout: LayoutConfig,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.command == (Command::Mint { count: 0 }) {
            bail!("--count must be greater than 0");
        }

        let layout = LayoutConfig::try_new(LayoutOptions {
            base_epoch_millis: args.base_epoch,
            worker_id: args.worker_id,
            worker_id_bits: args.worker_id_bits,
            seq_bits: args.seq_bits,
            max_seq: args.max_seq,
            min_seq: args.min_seq,
            max_drift_count: args.max_drift_count,
            method: args.method.into(),
        })?;

        Ok(Self {
            layout,
            command: args.command,
        })
    }
}
