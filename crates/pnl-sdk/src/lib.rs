//! Orchestration crate: the swap driver (C5), recursive aggregator (C6),
//! and the `pnl-cli`-facing pipeline entry point that composes them with
//! `pnl-scan`'s tag scanner and `pnl-oracle`'s witness assembler (§2 "Data
//! flow").
//!
//! Nothing here implements a circuit or a proving backend — those are the
//! external collaborators behind [`pnl_prover::ProverClient`] (§1, §6). This
//! crate's job is witness assembly, host-side mirroring of circuit
//! arithmetic for cross-checks, and the fixed-shape recursive combination
//! described in §4.6.

pub mod aggregator;
pub mod error;
pub mod pipeline;
pub mod swap_driver;

pub use aggregator::{FinalArtifact, aggregate, bootstrap_verifier_keys};
pub use error::{AggregationError, AssertionViolated, PipelineError, SwapDriveError};
pub use pipeline::{ScanTarget, run_pipeline};
pub use swap_driver::{SwapDriveData, SwapProofArtifact, drive_swap, encode_mirrored_pnl};
