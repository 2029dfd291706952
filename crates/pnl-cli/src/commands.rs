//! Command bodies dispatched from `main.rs`.
//!
//! Thin `eyre`-wrapped functions that load inputs, drive the library
//! crates, and write outputs, with all domain logic living in
//! `pnl-sdk`/`pnl-scan`/`pnl-oracle`.

use std::path::{Path, PathBuf};

use eyre::{Context as _, Result};
use pnl_core::{Field, PipelineConfig, TaggingSecretEntry, TaggingSecretExport};
use pnl_sdk::ScanTarget;
use schemars::schema_for;
use serde::{Deserialize, Serialize};

use crate::cli::{RunArgs, ScanArgs};
use crate::node_client::HttpNodeClient;
use crate::prover_client::HttpProverClient;

/// One scan target as stored in the `run` command's `--targets` file: a
/// tagging-secret entry paired with the app-siloed viewing secret needed to
/// decrypt whatever it discovers.
///
/// `pnl_core::TaggingSecretExport` (§6 "Persisted state") only carries the
/// tagging secret half; deriving the matching viewing secret from account
/// key material is wallet bootstrap machinery and out of scope (§1), so
/// this CLI-local schema asks the operator to supply both halves directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScanTargetEntry {
    /// The tagging-secret entry to scan with.
    pub entry: TaggingSecretEntry,
    /// The app-siloed viewing secret to decrypt this entry's hits with.
    pub viewing_secret: Field,
}

/// The `run` command's `--targets` input file: every scan target for one
/// account, in the same `{account, ...}` shape as
/// [`TaggingSecretExport`] so the two files can be derived from one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScanTargetsFile {
    /// Opaque account identifier this file belongs to.
    pub account: String,
    /// Every scan target to run the pipeline over.
    pub targets: Vec<ScanTargetEntry>,
}

impl ScanTargetsFile {
    /// Build a targets file from a [`TaggingSecretExport`] and a matching
    /// viewing secret for every entry, in order.
    ///
    /// # Errors
    /// Returns an error if `viewing_secrets` is shorter than
    /// `export.secrets`.
    pub fn from_export(export: TaggingSecretExport, viewing_secrets: &[Field]) -> Result<Self> {
        eyre::ensure!(
            viewing_secrets.len() >= export.secrets.len(),
            "need {} viewing secrets, got {}",
            export.secrets.len(),
            viewing_secrets.len()
        );
        let targets = export
            .secrets
            .into_iter()
            .zip(viewing_secrets.iter().copied())
            .map(|(entry, viewing_secret)| ScanTargetEntry {
                entry,
                viewing_secret,
            })
            .collect();
        Ok(Self {
            account: export.account,
            targets,
        })
    }
}

/// The `run` command's output record, written to `--output` as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalArtifactRecord {
    /// The final proof's six public outputs (§3).
    pub public_outputs: pnl_core::SwapPublicOutputs,
    /// The signed PnL, decoded for convenience alongside its field encoding.
    pub signed_pnl: i64,
    /// The final proof's bytes, hex-encoded.
    pub proof_hex: String,
    /// Diagnostic run summary (§9 ambient observability).
    pub summary: pnl_core::RunSummary,
}

/// Run the full pipeline: load inputs, drive every discovered swap, and
/// aggregate into one final proof, writing the result to `args.output`.
///
/// # Errors
/// Returns an error if an input file cannot be read or parsed, if either
/// HTTP client cannot be constructed, or if the pipeline itself fails
/// (propagated with the swap index or aggregation level attached, per §7).
pub async fn run(args: RunArgs) -> Result<()> {
    let config = load_json::<PipelineConfig>(&args.config)
        .await
        .with_context(|| format!("failed to load pipeline config {}", args.config.display()))?;
    let targets_file = load_json::<ScanTargetsFile>(&args.targets)
        .await
        .with_context(|| format!("failed to load scan targets {}", args.targets.display()))?;

    let targets: Vec<ScanTarget> = targets_file
        .targets
        .into_iter()
        .map(|t| ScanTarget {
            entry: t.entry,
            viewing_secret: t.viewing_secret,
        })
        .collect();
    eyre::ensure!(!targets.is_empty(), "targets file has no scan targets");

    let node = HttpNodeClient::new(config.node_endpoint.clone(), config.node_timeout())
        .context("failed to build node HTTP client")?;
    let prover = HttpProverClient::new(config.prover_endpoint.clone(), config.prover_timeout())
        .context("failed to build prover HTTP client")?;

    tracing::info!(
        account = %targets_file.account,
        target_count = targets.len(),
        "starting pipeline run"
    );

    let (final_artifact, summary) = pnl_sdk::run_pipeline(
        &node,
        &prover,
        &config,
        &targets,
        args.oracle_address,
        args.assets_map_slot,
    )
    .await
    .map_err(|e| eyre::eyre!("{e}"))?;

    let record = FinalArtifactRecord {
        public_outputs: final_artifact.public_outputs,
        signed_pnl: final_artifact.public_outputs.signed_pnl(),
        proof_hex: hex::encode(&final_artifact.proof.proof),
        summary,
    };
    write_json(&args.output, &record)
        .await
        .with_context(|| format!("failed to write output {}", args.output.display()))?;

    tracing::info!(
        signed_pnl = record.signed_pnl,
        output = %args.output.display(),
        "pipeline run complete"
    );
    Ok(())
}

/// Run only the tag-scanner (C1) and report what it discovers, without
/// decrypting or proving anything.
///
/// # Errors
/// Returns an error if the node HTTP client cannot be constructed, the scan
/// itself fails, or (when `--output` is set) the result cannot be written.
pub async fn scan(args: ScanArgs) -> Result<()> {
    let node = HttpNodeClient::new(
        args.node_endpoint.clone(),
        std::time::Duration::from_secs(args.node_timeout_secs),
    )
    .context("failed to build node HTTP client")?;

    let discovered = pnl_scan::scan_tags(
        &node,
        args.secret,
        args.app,
        args.start_index,
        args.max_indices,
        args.batch_size,
    )
    .await
    .map_err(|e| eyre::eyre!("{e}"))?;

    tracing::info!(count = discovered.len(), "tag scan complete");
    if let Some(output) = &args.output {
        write_json(output, &discovered)
            .await
            .with_context(|| format!("failed to write output {}", output.display()))?;
    }
    Ok(())
}

/// Print the JSON schema for [`PipelineConfig`] to stdout.
///
/// # Errors
/// Returns an error if schema serialization fails.
#[allow(clippy::print_stdout, reason = "prints a schema document on request")]
pub fn config_schema() -> Result<()> {
    let schema = schema_for!(PipelineConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Print the JSON schema for [`ScanTargetsFile`] to stdout.
///
/// # Errors
/// Returns an error if schema serialization fails.
#[allow(clippy::print_stdout, reason = "prints a schema document on request")]
pub fn targets_schema() -> Result<()> {
    let schema = schema_for!(ScanTargetsFile);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

async fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

async fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
