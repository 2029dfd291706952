//! Error taxonomy for the swap driver (C5) and aggregator (C6) (§7).
//!
//! §7 names a single `AssertionViolated(kind)` variant covering four kinds
//! of host-mirrored circuit assertion failure: chronology, oracle mismatch,
//! FIFO under-consumption, and lot-root chain mismatch. [`AssertionViolated`]
//! models that as one enum shared by both [`SwapDriveError`] (chronology,
//! FIFO under-consumption) and [`AggregationError`] (chronology again at the
//! combinator level, oracle mismatch, root-chain mismatch) — a single
//! result-kind discriminant shared across both call sites (§9).

use pnl_lottree::LotTreeError;
use pnl_oracle::OracleError;
use pnl_prover::ProverError;

/// One of the four host-mirrored circuit assertions that can fail (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AssertionViolated {
    /// §4.5 step 3: a swap's block number preceded the previous swap's.
    #[error("chronology violated: block {block} precedes previous block {previous}")]
    Chronology {
        /// The offending swap's block number.
        block: u64,
        /// The previous swap's block number.
        previous: u64,
    },
    /// §4.6: two proofs being aggregated declared different oracle
    /// addresses.
    #[error("oracle mismatch: left price feed does not match right price feed")]
    OracleMismatch,
    /// §4.5 step 8: FIFO consumption exhausted every tracked lot without
    /// covering the full sell amount — the user attempted to sell more than
    /// their tracked balance.
    #[error("FIFO under-consumption: {remaining} units unsold after exhausting tracked lots")]
    FifoUnderConsumption {
        /// Units still unsold after every lot was scanned.
        remaining: u128,
    },
    /// §4.6: `left.remaining_lot_state_root != right.initial_lot_state_root`.
    #[error("lot-state root chain mismatch between adjacent proofs")]
    RootChainMismatch,
}

/// Errors raised driving one swap end-to-end (§4.5, §7).
#[derive(Debug, thiserror::Error)]
pub enum SwapDriveError<NE, PE>
where
    NE: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    /// §7 `DecryptError`: the ciphertext body was too malformed to attempt
    /// decryption at all (a clean MAC failure is not an error — see
    /// [`crate::swap_driver::drive_swap`]'s `Ok(None)` return).
    #[error("decrypt failed: {0}")]
    Decrypt(#[from] pnl_scan::DecryptError),
    /// §7 `InvalidInput`: the decrypted plaintext did not have the expected
    /// shape.
    #[error("invalid plaintext: {0}")]
    InvalidPlaintext(#[from] pnl_core::InvalidPlaintext),
    /// §7 `AssertionViolated`.
    #[error(transparent)]
    Assertion(#[from] AssertionViolated),
    /// §7 `LotTreeFull` and the tree's other operational errors.
    #[error(transparent)]
    LotTree(#[from] LotTreeError),
    /// The node RPC for a block header failed.
    #[error("node RPC failed fetching block header: {0}")]
    Node(#[source] NE),
    /// §7 `OracleWitnessUnavailable`.
    #[error(transparent)]
    Oracle(#[from] OracleError<NE>),
    /// §4.5 "Numeric policy": an oracle price did not fit the host's `u128`
    /// price representation.
    #[error("oracle price for a swap side did not fit u128")]
    PriceOutOfRange,
    /// §4.5 "Numeric policy": `amount * price` (or its accumulation into
    /// signed PnL) overflowed `i64`. Kept as a proving-time error rather
    /// than folded into [`AssertionViolated`], since it is a numeric
    /// precondition on the circuit's arithmetic rather than a mirrored
    /// circuit assertion.
    #[error("amount/price overflow: realized PnL does not fit i64")]
    AmountOverflow,
    /// §4.5 step 15 / §9: the host-mirrored lot-state root diverged from the
    /// proof's declared `remaining_lot_state_root`. Fatal — chain
    /// continuity for the next swap depends on bit-exact agreement.
    #[error(
        "lot-state mirror diverged from the proof's declared root: host computed {host}, proof declared {declared}"
    )]
    LotMirrorDivergence {
        /// The root the host's in-memory tree actually reached.
        host: pnl_core::Field,
        /// The root the proof's public outputs declared.
        declared: pnl_core::Field,
    },
    /// §4.5 step 14: the host's mirrored PnL diverged from the proof's
    /// declared signed PnL output.
    #[error("mirrored PnL {mirrored} does not match proof-declared PnL {declared}")]
    PnlMismatch {
        /// The PnL the host computed by mirroring the circuit's arithmetic.
        mirrored: i64,
        /// The PnL the proof's public outputs declared.
        declared: i64,
    },
    /// §6 / §7 `ProverFailure`: `execute`/`generate_proof`/`verify_proof`
    /// failed, or verification returned false.
    #[error(transparent)]
    Prover(#[from] ProverError<PE>),
    /// The prover's declared return values were not a well-formed six-field
    /// [`pnl_core::SwapPublicOutputs`].
    #[error(transparent)]
    WrongOutputCount(#[from] pnl_core::WrongOutputCount),
}

/// Errors raised aggregating swap (and summary) proofs into the final
/// recursive tree (§4.6, §7).
#[derive(Debug, thiserror::Error)]
pub enum AggregationError<PE>
where
    PE: std::error::Error + Send + Sync + 'static,
{
    /// §7 `AssertionViolated`: oracle mismatch or root-chain mismatch
    /// between paired proofs.
    #[error(transparent)]
    Assertion(#[from] AssertionViolated),
    /// §6 / §7 `ProverFailure`.
    #[error(transparent)]
    Prover(#[from] ProverError<PE>),
    /// A combinator's declared return values were not a well-formed
    /// six-field [`pnl_core::SwapPublicOutputs`].
    #[error(transparent)]
    WrongOutputCount(#[from] pnl_core::WrongOutputCount),
    /// §4.6 "Verifier-key bootstrap": a child proof's embedded
    /// verifier-key hash was not admissible at its level.
    #[error("verifier key hash {hash} is not admissible at level {level}")]
    InadmissibleVerifierKey {
        /// The offending hash, hex-encoded.
        hash: String,
        /// The aggregation level the check was performed at.
        level: u32,
    },
    /// §4.6 "`pnl = left.pnl + right.pnl` in signed 64-bit": the sum did not
    /// fit `i64`.
    #[error("aggregated PnL overflow combining two child proofs")]
    PnlOverflow,
    /// The host-mirrored combined PnL diverged from the combinator's
    /// declared PnL output.
    #[error("mirrored aggregate PnL {mirrored} does not match proof-declared PnL {declared}")]
    PnlMismatch {
        /// The PnL the host computed from the two children's declared PnLs.
        mirrored: i64,
        /// The PnL the combinator's public outputs declared.
        declared: i64,
    },
    /// The host-mirrored combined root (`H([left, right ?? zero_hash])`)
    /// diverged from the combinator's declared root/leaf output.
    #[error("mirrored root {mirrored} does not match proof-declared root {declared}")]
    RootMismatch {
        /// The root the host computed by pairing the children's roots.
        mirrored: pnl_core::Field,
        /// The root the combinator's public outputs declared.
        declared: pnl_core::Field,
    },
    /// §4.6 "States": there is no meaningful proof to produce for an empty
    /// batch ("Idle" is not itself a producible artifact).
    #[error("cannot aggregate an empty batch of swap proofs")]
    EmptyBatch,
}

/// The top-level pipeline error, composing every stage's errors with the
/// context §7 requires attached: "which swap index, which level" (§7
/// Policy).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError<NE, PE>
where
    NE: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    /// C1 tag-window scanning failed.
    #[error("tag scan failed: {0}")]
    Scan(#[from] pnl_scan::ScanError<NE>),
    /// Driving swap at `index` (0-based, in chronological order) failed.
    #[error("swap drive failed at index {index}: {source}")]
    Swap {
        /// The 0-based chronological index of the failing swap.
        index: usize,
        /// The underlying swap-drive error.
        #[source]
        source: SwapDriveError<NE, PE>,
    },
    /// Aggregating at recursion `level` (0 = leaves) failed.
    #[error("aggregation failed at level {level}: {source}")]
    Aggregation {
        /// The recursion level the failure occurred at.
        level: u32,
        /// The underlying aggregation error.
        #[source]
        source: AggregationError<PE>,
    },
}
