//! Recursive aggregation (C6, §4.6): pair swap (and summary) proofs into a
//! binary tree with a fixed-shape combinator, handling odd arities with
//! per-level zero hashes and enforcing lot-chaining, chronology, and
//! oracle-identity invariants between every pair.
#![allow(
    clippy::arithmetic_side_effects,
    reason = "level/children-count bookkeeping bounded by the swap count of one run, not attacker-controlled"
)]

use pnl_core::{Field, Hash, SWAP_PUBLIC_OUTPUTS_LEN, SwapPublicOutputs, encode_signed_pnl};
use pnl_prover::{
    AdmissibleVerifierKeys, ChildArtifact, CombinatorInput, GeneratedProof, ProverClient,
    ProverError, VerifierKey, VerifierTarget,
};

use crate::error::{AggregationError, AssertionViolated};

/// Bootstrap [`AdmissibleVerifierKeys`] from the first leaf proof a run
/// produces (§4.6 "Verifier-key bootstrap").
///
/// `LEAF_VK` is extracted directly from `leaf_proof`. `SUMMARY_VK` cannot be
/// extracted the same way — no summary proof exists yet — so this runs one
/// throwaway combinator application over the same leaf, right-absent, at
/// level 0 (where the summary-vk-hash check is a pass-through, avoiding the
/// chicken-and-egg problem §4.6 describes) purely to get a summary proof to
/// extract a verifier key from. The throwaway proof and its outputs are
/// discarded; only the verifier-key material survives.
///
/// # Errors
/// Returns [`AggregationError::Prover`] if any backend call fails, or
/// [`AggregationError::WrongOutputCount`] if the throwaway combination
/// doesn't declare six public outputs.
pub async fn bootstrap_verifier_keys<Prover: ProverClient>(
    prover: &Prover,
    leaf_proof: &GeneratedProof,
    leaf_public_outputs: SwapPublicOutputs,
) -> Result<AdmissibleVerifierKeys, AggregationError<Prover::Error>> {
    let leaf_artifacts = prover
        .generate_recursive_proof_artifacts(leaf_proof, SWAP_PUBLIC_OUTPUTS_LEN)
        .await
        .map_err(ProverError::Backend)?;
    let leaf_vk = VerifierKey {
        vk_as_fields: leaf_artifacts.vk_as_fields,
        vk_hash: leaf_artifacts.vk_hash,
    };

    let sample_child = ChildArtifact {
        public_outputs: leaf_public_outputs,
        vk_as_fields: leaf_vk.vk_as_fields.clone(),
        vk_hash: leaf_vk.vk_hash,
    };
    let throwaway_inputs = CombinatorInput {
        level: 0,
        left: sample_child,
        right: None,
    };
    let execution = prover
        .combine(&throwaway_inputs)
        .await
        .map_err(ProverError::Backend)?;
    // Confirm the throwaway execution at least has the right output shape
    // before spending a proof on it.
    let _ = SwapPublicOutputs::from_fields(&execution.return_values)?;

    let throwaway_proof = prover
        .generate_proof(&execution.witness, VerifierTarget::Summary)
        .await
        .map_err(ProverError::Backend)?;
    let summary_artifacts = prover
        .generate_recursive_proof_artifacts(&throwaway_proof, SWAP_PUBLIC_OUTPUTS_LEN)
        .await
        .map_err(ProverError::Backend)?;
    let summary_vk = VerifierKey {
        vk_as_fields: summary_artifacts.vk_as_fields,
        vk_hash: summary_artifacts.vk_hash,
    };

    tracing::info!("verifier keys bootstrapped from first leaf proof and throwaway summary");
    Ok(AdmissibleVerifierKeys {
        leaf_vk,
        summary_vk,
    })
}

/// The system's final answer: one summary proof whose six public outputs
/// are the batch's signed PnL, processed-ciphertext root, oracle address,
/// block range, and lot-state-root pair (§3, §4.6 "Final" state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalArtifact {
    /// The root-level proof, verified locally.
    pub proof: GeneratedProof,
    /// The root-level proof's six public outputs.
    pub public_outputs: SwapPublicOutputs,
}

/// Drive the aggregation tree to completion over `leaves` (§4.6 "Tree
/// construction").
///
/// `leaves` must already be in chronological block order (§5 "Ordering
/// guarantees"); the caller — `pnl-sdk::pipeline` in this workspace — is
/// responsible for that, since the aggregator has no way to recover
/// chronology once artifacts reach it out of order other than failing at
/// the first out-of-order pair.
///
/// Even a single leaf is wrapped in one combinator application with the
/// right child absent (§4.6: "the final proof shape is uniform"); this
/// falls out of the general pairing loop rather than needing a special
/// case, since a one-element level-0 input pairs with `None` exactly as an
/// odd-arity tail would.
///
/// # Errors
/// Returns [`AggregationError::EmptyBatch`] if `leaves` is empty (there is
/// no meaningful "Idle" proof to produce), or any error from
/// [`pair_level`] otherwise — every failure here is fatal to the run
/// (§4.6 "States": "no terminal error states beyond combinator failure").
pub async fn aggregate<Prover: ProverClient>(
    prover: &Prover,
    verifier_keys: &AdmissibleVerifierKeys,
    zero_hashes: &[Field],
    leaves: Vec<ChildArtifact>,
) -> Result<FinalArtifact, AggregationError<Prover::Error>> {
    if leaves.is_empty() {
        return Err(AggregationError::EmptyBatch);
    }

    let mut level = 0_u32;
    let mut current = leaves;
    tracing::info!(leaf_count = current.len(), "aggregation starting");

    loop {
        current = pair_level(prover, verifier_keys, zero_hashes, current, level).await?;
        tracing::info!(level, remaining = current.len(), "aggregation level complete");
        if current.len() == 1 {
            break;
        }
        level += 1;
    }

    let root = current.into_iter().next().expect("pairing always leaves at least one child");
    Ok(FinalArtifact {
        proof: root.proof,
        public_outputs: root.public_outputs,
    })
}

/// One artifact surviving a pairing pass, carrying the recursion artifacts
/// its parent-level combination will need.
struct PairedArtifact {
    proof: GeneratedProof,
    public_outputs: SwapPublicOutputs,
    vk_as_fields: Vec<Field>,
    vk_hash: Field,
}

impl From<PairedArtifact> for ChildArtifact {
    fn from(paired: PairedArtifact) -> Self {
        Self {
            public_outputs: paired.public_outputs,
            vk_as_fields: paired.vk_as_fields,
            vk_hash: paired.vk_hash,
        }
    }
}

/// Pair `children` left-to-right at `level`, combining each pair (or each
/// odd-arity tail element with `None`) into one [`ChildArtifact`] for the
/// next level (§4.6 "Tree construction").
async fn pair_level<Prover: ProverClient>(
    prover: &Prover,
    verifier_keys: &AdmissibleVerifierKeys,
    zero_hashes: &[Field],
    children: Vec<ChildArtifact>,
    level: u32,
) -> Result<Vec<ChildArtifact>, AggregationError<Prover::Error>> {
    let mut next_level = Vec::with_capacity(children.len().div_ceil(2));
    let mut iter = children.into_iter();
    loop {
        let Some(left) = iter.next() else { break };
        let right = iter.next();
        let paired = combine_pair(prover, verifier_keys, zero_hashes, level, left, right).await?;
        next_level.push(paired.into());
    }
    Ok(next_level)
}

/// Apply one combinator invocation to `(left, right)` (§4.6 "Combinator
/// contract"): host-side mirror the circuit's assertions and outputs
/// before driving the prover, then cross-check the declared outputs
/// against the mirror exactly as the swap driver does for its own circuit
/// (§4.5 "Lot mirroring").
async fn combine_pair<Prover: ProverClient>(
    prover: &Prover,
    verifier_keys: &AdmissibleVerifierKeys,
    zero_hashes: &[Field],
    level: u32,
    left: ChildArtifact,
    right: Option<ChildArtifact>,
) -> Result<PairedArtifact, AggregationError<Prover::Error>> {
    if !verifier_keys.is_admissible(level, left.vk_hash) {
        return Err(AggregationError::InadmissibleVerifierKey {
            hash: left.vk_hash.to_hex(),
            level,
        });
    }
    if let Some(right) = &right {
        if !verifier_keys.is_admissible(level, right.vk_hash) {
            return Err(AggregationError::InadmissibleVerifierKey {
                hash: right.vk_hash.to_hex(),
                level,
            });
        }
        check_invariants(&left.public_outputs, &right.public_outputs)?;
    }

    let mirrored = mirror_outputs(zero_hashes, level, &left.public_outputs, right.as_ref().map(|r| &r.public_outputs))?;

    let inputs = CombinatorInput {
        level,
        left: left.clone(),
        right: right.clone(),
    };
    let execution = prover
        .combine(&inputs)
        .await
        .map_err(ProverError::Backend)?;
    let declared = SwapPublicOutputs::from_fields(&execution.return_values)?;

    let proof = prover
        .generate_proof(&execution.witness, VerifierTarget::Summary)
        .await
        .map_err(ProverError::Backend)?;
    let verified = prover
        .verify_proof(&proof, VerifierTarget::Summary)
        .await
        .map_err(ProverError::Backend)?;
    if !verified {
        return Err(ProverError::ProofRejected.into());
    }

    if declared.leaf_or_root != mirrored.leaf_or_root {
        return Err(AggregationError::RootMismatch {
            mirrored: mirrored.leaf_or_root,
            declared: declared.leaf_or_root,
        });
    }
    let declared_pnl = declared.signed_pnl();
    let mirrored_pnl = mirrored.signed_pnl();
    if declared_pnl != mirrored_pnl {
        return Err(AggregationError::PnlMismatch {
            mirrored: mirrored_pnl,
            declared: declared_pnl,
        });
    }

    let artifacts = prover
        .generate_recursive_proof_artifacts(&proof, declared.to_fields().len())
        .await
        .map_err(ProverError::Backend)?;

    Ok(PairedArtifact {
        proof,
        public_outputs: declared,
        vk_as_fields: artifacts.vk_as_fields,
        vk_hash: artifacts.vk_hash,
    })
}

/// Enforce the three pairwise invariants §4.6 names ("skipped when right is
/// absent"): lot-root chaining, chronological ordering, and shared oracle
/// identity.
fn check_invariants<E>(
    left: &SwapPublicOutputs,
    right: &SwapPublicOutputs,
) -> Result<(), AggregationError<E>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if left.remaining_lot_state_root != right.initial_lot_state_root {
        return Err(AssertionViolated::RootChainMismatch.into());
    }
    let left_block = block_number_u64(left.block_number);
    let right_block = block_number_u64(right.block_number);
    if left_block > right_block {
        return Err(AssertionViolated::Chronology {
            block: left_block,
            previous: right_block,
        }
        .into());
    }
    if left.price_feed_address != right.price_feed_address {
        return Err(AssertionViolated::OracleMismatch.into());
    }
    Ok(())
}

/// Decode a [`SwapPublicOutputs::block_number`] field back to `u64`,
/// saturating to `u64::MAX` if it somehow doesn't fit (it is always
/// constructed from a `u64` by this workspace, so this is unreachable in
/// practice).
fn block_number_u64(field: Field) -> u64 {
    field
        .to_u128()
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(u64::MAX)
}

/// Host-side mirror of the combinator's six output fields (§4.6
/// "Combinator contract"), computed before the prover is ever invoked so
/// the declared outputs can be cross-checked bit-for-bit.
fn mirror_outputs<E>(
    zero_hashes: &[Field],
    level: u32,
    left: &SwapPublicOutputs,
    right: Option<&SwapPublicOutputs>,
) -> Result<SwapPublicOutputs, AggregationError<E>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let right_root = match right {
        Some(right) => right.leaf_or_root,
        None => *zero_hashes
            .get(usize::try_from(level).unwrap_or(usize::MAX))
            .unwrap_or(&Field::zero()),
    };
    let root = Hash::pair(left.leaf_or_root, right_root);

    let left_pnl = i128::from(left.signed_pnl());
    let right_pnl = right.map_or(0_i128, |r| i128::from(r.signed_pnl()));
    let pnl = left_pnl
        .checked_add(right_pnl)
        .and_then(|sum| i64::try_from(sum).ok())
        .ok_or(AggregationError::PnlOverflow)?;

    let remaining_lot_state_root = right.map_or(left.remaining_lot_state_root, |r| r.remaining_lot_state_root);
    let initial_lot_state_root = left.initial_lot_state_root;
    let price_feed_address = left.price_feed_address;
    let left_block = left.block_number.to_u128().unwrap_or(0);
    let right_block = right.and_then(|r| r.block_number.to_u128()).unwrap_or(0);
    let block_number = Field::from_u128(left_block.max(right_block));

    Ok(SwapPublicOutputs {
        leaf_or_root: root,
        pnl: encode_signed_pnl(pnl),
        remaining_lot_state_root,
        initial_lot_state_root,
        price_feed_address,
        block_number,
    })
}
