//! Command-line interface for the `pnl` binary.

use std::path::PathBuf;

use clap::Parser;
use pnl_core::Field;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "pnl")]
#[command(about = "Confidential AMM PnL proof orchestrator")]
pub struct Cli {
    /// Top-level command.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Run the full pipeline: scan, drive every swap, aggregate (§2 "Data
    /// flow").
    Run {
        /// Run arguments.
        #[command(flatten)]
        args: RunArgs,
    },
    /// Run only the tag-scanner (C1), for diagnostics — report how many
    /// ciphertexts a `(secret, app)` pair discovers without decrypting or
    /// proving anything.
    Scan {
        /// Scan arguments.
        #[command(flatten)]
        args: ScanArgs,
    },
    /// Print the JSON schema for [`pnl_core::PipelineConfig`].
    ConfigSchema,
    /// Print the JSON schema for the scan-targets input file consumed by
    /// `run`.
    TargetsSchema,
}

/// Arguments for `pnl run`.
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// JSON file holding the scan targets (tagging secrets paired with
    /// their app-siloed viewing secrets).
    #[arg(long, env = "PNL_TARGETS_FILE")]
    pub targets: PathBuf,

    /// JSON file holding the [`pnl_core::PipelineConfig`].
    #[arg(long, env = "PNL_CONFIG_FILE")]
    pub config: PathBuf,

    /// The price-oracle contract address, shared by the whole batch.
    #[arg(long, env = "PNL_ORACLE_ADDRESS")]
    pub oracle_address: Field,

    /// The oracle's assets-map storage slot.
    #[arg(long, env = "PNL_ASSETS_MAP_SLOT")]
    pub assets_map_slot: Field,

    /// Where to write the final artifact (public outputs, proof bytes as
    /// hex, and the run summary) as JSON.
    #[arg(long, env = "PNL_OUTPUT_FILE", default_value = "pnl-final-artifact.json")]
    pub output: PathBuf,
}

/// Arguments for `pnl scan`.
#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// Node endpoint to query.
    #[arg(long, env = "PNL_NODE_ENDPOINT")]
    pub node_endpoint: String,

    /// Per-call node RPC timeout, in seconds.
    #[arg(long, env = "PNL_NODE_TIMEOUT_SECS", default_value_t = 30)]
    pub node_timeout_secs: u64,

    /// The tagging secret to scan with.
    #[arg(long)]
    pub secret: Field,

    /// The contract address this secret is siloed to.
    #[arg(long)]
    pub app: Field,

    /// First tag-window index to scan.
    #[arg(long, default_value_t = 0)]
    pub start_index: u64,

    /// Ceiling on the number of tag-window indices to walk (§4.1).
    #[arg(long, default_value_t = 10_000)]
    pub max_indices: u64,

    /// Number of tag indices queried per node round-trip (§4.1).
    #[arg(long, default_value_t = 32)]
    pub batch_size: u64,

    /// Where to write the discovered ciphertexts (block number and tag,
    /// body omitted) as JSON. If absent, only the count is logged.
    #[arg(long)]
    pub output: Option<PathBuf>,
}
