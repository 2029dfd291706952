//! Swap driver (C5, §4.5): decrypt, mutate the lot-state tree, assemble a
//! circuit input, drive the prover, return the artifact.
#![allow(
    clippy::arithmetic_side_effects,
    reason = "FIFO consumption and lot accounting over bounded MAX_LOTS (32) slots, not attacker-controlled loop bounds"
)]

use pnl_core::{
    Ciphertext, Field, Lot, NodeClient, SwapPlaintext, SwapPublicOutputs, encode_signed_pnl,
};
use pnl_lottree::{LotStateTree, ciphertext_to_leaf};
use pnl_oracle::fetch_oracle_witness;
use pnl_prover::{CircuitInput, LotSideWitness, ProverClient, ProverError, VerifierTarget};
use pnl_scan::decrypt;

use crate::error::{AssertionViolated, SwapDriveError};

/// Host-side bookkeeping returned alongside a swap's proof, used for
/// cross-checking the circuit's declared outputs (§4.5: "a mirrored TS-side
/// signed PnL for cross-check").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDriveData {
    /// The signed PnL the host computed by mirroring the circuit's FIFO
    /// arithmetic, already cross-checked against the proof's declared PnL
    /// by [`drive_swap`].
    pub mirrored_pnl: i64,
    /// The lot-state-tree slot `token_in` was bound to.
    pub sell_slot: usize,
    /// The lot-state-tree slot `token_out` was bound to.
    pub buy_slot: usize,
}

/// The result of driving one swap through the full pipeline (§4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapProofArtifact {
    /// The generated (and locally verified) proof.
    pub proof: pnl_prover::GeneratedProof,
    /// The circuit's six declared public outputs.
    pub public_outputs: SwapPublicOutputs,
    /// Host-side bookkeeping for cross-checks and downstream aggregation
    /// bookkeeping.
    pub swap_data: SwapDriveData,
}

/// Drive one discovered ciphertext end-to-end (§4.5 steps 1-15).
///
/// Returns `Ok(None)` when the ciphertext does not decrypt under
/// `viewing_secret` — per §4.2/§7, a clean MAC failure means the event
/// belongs to another recipient or an out-of-scope event type, and is
/// silently dropped here (the tag scanner that discovered it already
/// reported it to its own caller as a raw buffer).
///
/// # Errors
/// See [`SwapDriveError`] for the full taxonomy. Every error is fatal to
/// the run per §7: there is no partial-success path through one swap.
#[allow(clippy::too_many_arguments, reason = "mirrors the §4.5 step-13 input contract directly; bundling into a params struct would only rename these same fields")]
#[allow(clippy::too_many_lines, reason = "one straight-line walk through the 15 numbered steps of §4.5; splitting it would scatter a single linear protocol across several functions")]
pub async fn drive_swap<Node, Prover>(
    node: &Node,
    prover: &Prover,
    lot_tree: &mut LotStateTree,
    ciphertext: &Ciphertext,
    viewing_secret: Field,
    block_number: u64,
    previous_block_number: u64,
    oracle_address: Field,
    assets_map_slot: Field,
) -> Result<Option<SwapProofArtifact>, SwapDriveError<Node::Error, Prover::Error>>
where
    Node: NodeClient,
    Prover: ProverClient,
{
    // 1. Decrypt.
    let Some(plaintext_fields) = decrypt(&ciphertext.body, viewing_secret)? else {
        tracing::debug!("ciphertext did not decrypt under this viewing secret; dropping");
        return Ok(None);
    };

    // 2. Extract.
    let plaintext = SwapPlaintext::from_fields(&plaintext_fields)?;

    // 3. Chronology check (mirrored in the circuit).
    if block_number < previous_block_number {
        return Err(AssertionViolated::Chronology {
            block: block_number,
            previous: previous_block_number,
        }
        .into());
    }

    // 4. Slot binding.
    let sell_slot = lot_tree.assign(plaintext.token_in)?;
    let buy_slot = lot_tree.assign(plaintext.token_out)?;

    // 5. Oracle block header.
    let header = node
        .get_block_header(block_number)
        .await
        .map_err(SwapDriveError::Node)?;

    // 6. Oracle witnesses, sell side then buy side.
    let sell_witness = fetch_oracle_witness(
        node,
        oracle_address,
        assets_map_slot,
        plaintext.token_in,
        block_number,
    )
    .await?;
    let buy_witness = fetch_oracle_witness(
        node,
        oracle_address,
        assets_map_slot,
        plaintext.token_out,
        block_number,
    )
    .await?;
    let sell_price = sell_witness
        .witness
        .leaf_preimage
        .value
        .to_u128()
        .ok_or(SwapDriveError::PriceOutOfRange)?;
    let buy_price = buy_witness
        .witness
        .leaf_preimage
        .value
        .to_u128()
        .ok_or(SwapDriveError::PriceOutOfRange)?;

    // 7. Snapshot initial root.
    let initial_lot_state_root = lot_tree.root();

    // 8. Sell side: capture pre-mutation witness, then FIFO-consume.
    let (sell_lots_before, sell_num_lots_before, _) = lot_tree.get_lots(plaintext.token_in);
    let sibling_sell = lot_tree.sibling_path(sell_slot)?;

    let mut sell_lots: Vec<Lot> = sell_lots_before
        .iter()
        .take(sell_num_lots_before)
        .copied()
        .collect();
    let mut remaining = plaintext.amount_in;
    let mut pnl: i64 = 0;
    for lot in &mut sell_lots {
        if remaining == 0 {
            break;
        }
        let consumed = remaining.min(lot.amount);
        pnl = accumulate_realized_pnl(pnl, consumed, sell_price, lot.cost_per_unit)?;
        lot.amount -= consumed;
        remaining -= consumed;
    }
    if remaining != 0 {
        return Err(AssertionViolated::FifoUnderConsumption { remaining }.into());
    }
    sell_lots.retain(Lot::is_present);
    lot_tree.set_lots(plaintext.token_in, &sell_lots)?;

    // 10. Buy side: capture the post-sell-mutation witness, then append.
    let (buy_lots_before, buy_num_lots_before, _) = lot_tree.get_lots(plaintext.token_out);
    let sibling_buy = lot_tree.sibling_path(buy_slot)?;

    let mut buy_lots: Vec<Lot> = buy_lots_before
        .iter()
        .take(buy_num_lots_before)
        .copied()
        .collect();
    buy_lots.push(Lot::new(plaintext.amount_out, buy_price));
    lot_tree.set_lots(plaintext.token_out, &buy_lots)?;

    // 11. Final root.
    let remaining_lot_state_root = lot_tree.root();

    // 12. Leaf hash.
    let leaf = ciphertext_to_leaf(ciphertext);

    // 13. Assemble the circuit input record.
    let circuit_input = CircuitInput {
        plaintext_fields,
        ciphertext_fields: ciphertext.leaf_fields(),
        app_siloed_viewing_secret: viewing_secret,
        block_number,
        previous_block_number,
        initial_lot_state_root,
        sell: LotSideWitness {
            token: plaintext.token_in,
            lots: sell_lots_before,
            num_lots: sell_num_lots_before,
            slot: sell_slot,
            sibling_path: sibling_sell,
        },
        buy: LotSideWitness {
            token: plaintext.token_out,
            lots: buy_lots_before,
            num_lots: buy_num_lots_before,
            slot: buy_slot,
            sibling_path: sibling_buy,
        },
        oracle_address,
        assets_map_slot,
        public_data_tree_root: header.public_data_tree_root,
        sell_price_witness: sell_witness.witness,
        buy_price_witness: buy_witness.witness,
    };

    // 14. Drive the prover: execute, generate, verify (self-check).
    let execution = prover
        .execute(&circuit_input)
        .await
        .map_err(ProverError::Backend)?;
    let public_outputs = SwapPublicOutputs::from_fields(&execution.return_values)?;

    let proof = prover
        .generate_proof(&execution.witness, VerifierTarget::Leaf)
        .await
        .map_err(ProverError::Backend)?;
    let verified = prover
        .verify_proof(&proof, VerifierTarget::Leaf)
        .await
        .map_err(ProverError::Backend)?;
    if !verified {
        return Err(ProverError::ProofRejected.into());
    }

    // Cross-checks: the host mirror must agree with the circuit to the last
    // bit (§4.5 "Lot mirroring").
    if public_outputs.remaining_lot_state_root != remaining_lot_state_root {
        return Err(SwapDriveError::LotMirrorDivergence {
            host: remaining_lot_state_root,
            declared: public_outputs.remaining_lot_state_root,
        });
    }
    let declared_pnl = public_outputs.signed_pnl();
    if declared_pnl != pnl {
        return Err(SwapDriveError::PnlMismatch {
            mirrored: pnl,
            declared: declared_pnl,
        });
    }
    debug_assert_eq!(public_outputs.leaf_or_root, leaf, "leaf hash must match the circuit's declared leaf");

    tracing::info!(block_number, pnl, "swap driven");

    Ok(Some(SwapProofArtifact {
        proof,
        public_outputs,
        swap_data: SwapDriveData {
            mirrored_pnl: pnl,
            sell_slot,
            buy_slot,
        },
    }))
}

/// `pnl += consumed * (sell_price - cost_per_unit)`, computed in `i128` to
/// avoid overflow mid-calculation, then folded into the running signed-64
/// accumulator. Any step that does not fit is §4.5's "proving-time error"
/// (§4.5 "Numeric policy": amounts/prices are bounded so this fits `i64` in
/// the well-formed case; a real overflow here means the circuit would have
/// rejected the input anyway).
fn accumulate_realized_pnl<NE, PE>(
    pnl: i64,
    consumed: u128,
    sell_price: u128,
    cost_per_unit: u128,
) -> Result<i64, SwapDriveError<NE, PE>>
where
    NE: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    let consumed = i128::try_from(consumed).map_err(|_| SwapDriveError::AmountOverflow)?;
    let sell_price = i128::try_from(sell_price).map_err(|_| SwapDriveError::AmountOverflow)?;
    let cost = i128::try_from(cost_per_unit).map_err(|_| SwapDriveError::AmountOverflow)?;

    let spread = sell_price
        .checked_sub(cost)
        .ok_or(SwapDriveError::AmountOverflow)?;
    let term = spread
        .checked_mul(consumed)
        .ok_or(SwapDriveError::AmountOverflow)?;
    let term = i64::try_from(term).map_err(|_| SwapDriveError::AmountOverflow)?;
    pnl.checked_add(term).ok_or(SwapDriveError::AmountOverflow)
}

/// Encode a swap's mirrored signed PnL as the wire-format field the circuit
/// uses, exposed for callers assembling a summary cross-check by hand
/// (tests, primarily).
#[must_use]
pub fn encode_mirrored_pnl(pnl: i64) -> Field {
    encode_signed_pnl(pnl)
}
