//! Concrete circuit input/output records (§4.5 step 13, §9 "Dynamic typing").
//!
//! The source feeds the prover dynamically-typed records; here every field
//! named in §4.5 step 13 gets a fixed slot in a typed struct, with
//! fixed-length arrays for sibling paths and lot arrays. Serialization to
//! whatever wire format the prover backend demands happens only at the
//! `ProverClient` boundary, not in this type.

use pnl_core::{Field, MAX_LOTS, MESSAGE_CIPHERTEXT_LEN};
use pnl_lottree::H_LOT;
use serde::{Deserialize, Serialize};

use pnl_core::PublicDataWitness;

/// Depth of the node's public-data tree (§6: "currently 40").
pub const PUBLIC_DATA_TREE_DEPTH: usize = 40;

/// Number of fields the decryptor yields for a successfully decrypted
/// ciphertext body: [`MESSAGE_CIPHERTEXT_LEN`] minus the ephemeral-point
/// x-coordinate and the AEAD tag field (§4.2, mirrored from
/// `pnl_scan::decrypt::PLAINTEXT_FIELDS` without a dependency on that crate).
pub const PLAINTEXT_FIELD_COUNT: usize = MESSAGE_CIPHERTEXT_LEN - 2;

/// This swap's slot-binding side, sell or buy, with its lot state and
/// sibling path captured at the point the swap driver read them (§4.5 steps
/// 8 and 10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSideWitness {
    /// The token this side concerns.
    pub token: Field,
    /// Lot array, padded to `MAX_LOTS`.
    pub lots: [pnl_core::Lot; MAX_LOTS],
    /// Number of non-empty lots among `lots`.
    pub num_lots: usize,
    /// This token's lot-state-tree slot.
    pub slot: usize,
    /// Sibling path for `slot`, captured before this swap's mutation.
    pub sibling_path: [Field; H_LOT],
}

/// The full set of inputs the swap circuit needs for one event (§4.5 step
/// 13).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitInput {
    /// Decrypted plaintext fields, as returned by the decryptor.
    pub plaintext_fields: [Field; PLAINTEXT_FIELD_COUNT],
    /// Ciphertext fields (tag-as-field followed by body), as hashed for the
    /// leaf.
    pub ciphertext_fields: [Field; MESSAGE_CIPHERTEXT_LEN + 1],
    /// The recipient's app-siloed viewing secret used to decrypt this
    /// event.
    pub app_siloed_viewing_secret: Field,
    /// This event's block number.
    pub block_number: u64,
    /// The previous event's block number, for the chronology check.
    pub previous_block_number: u64,
    /// Lot-state root before this swap (`R0`).
    pub initial_lot_state_root: Field,
    /// Sell-side lot witness (`token_in`).
    pub sell: LotSideWitness,
    /// Buy-side lot witness (`token_out`), captured after the sell-side
    /// mutation (§4.5 step 10).
    pub buy: LotSideWitness,
    /// The price-oracle contract address.
    pub oracle_address: Field,
    /// The oracle's assets-map storage slot.
    pub assets_map_slot: Field,
    /// Public-data-tree root at `block_number`.
    pub public_data_tree_root: Field,
    /// Oracle witness for `token_in`'s sell price.
    pub sell_price_witness: PublicDataWitness,
    /// Oracle witness for `token_out`'s buy price.
    pub buy_price_witness: PublicDataWitness,
}

/// One child artifact fed into a combinator application: a proof's declared
/// public outputs together with the verifier-key material the combinator
/// asserts against the admissible set (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildArtifact {
    /// The child proof's six public outputs.
    pub public_outputs: pnl_core::SwapPublicOutputs,
    /// The child's verifier key, field-encoded for in-circuit use.
    pub vk_as_fields: Vec<Field>,
    /// The child's verifier-key hash, asserted against the admissible set.
    pub vk_hash: Field,
}

/// Inputs to one combinator application (§4.6).
///
/// `right` is `None` for an odd-arity level's trailing element and for the
/// single-element privacy wrap; the combinator substitutes
/// `zero_hashes(level)` for the absent side's root and skips the
/// lot-chaining/chronology/oracle-identity checks accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinatorInput {
    /// Recursion level this combinator application runs at (0 = pairing
    /// leaf proofs).
    pub level: u32,
    /// The left (always present) child.
    pub left: ChildArtifact,
    /// The right child, absent at an odd-arity tail or for the
    /// single-element wrap.
    pub right: Option<ChildArtifact>,
}

#[cfg(test)]
mod tests {
    use super::{CircuitInput, LotSideWitness, PLAINTEXT_FIELD_COUNT, PUBLIC_DATA_TREE_DEPTH};
    use pnl_core::{Field, Lot, MAX_LOTS, MESSAGE_CIPHERTEXT_LEN, PublicDataLeafPreimage, PublicDataWitness};

    fn sample_side(token: Field) -> LotSideWitness {
        LotSideWitness {
            token,
            lots: [Lot::EMPTY; MAX_LOTS],
            num_lots: 0,
            slot: 0,
            sibling_path: [Field::zero(); 3],
        }
    }

    fn sample_witness() -> PublicDataWitness {
        PublicDataWitness {
            leaf_preimage: PublicDataLeafPreimage {
                slot: Field::zero(),
                value: Field::zero(),
                next_slot: Field::zero(),
                next_index: 0,
            },
            index: 0,
            sibling_path: vec![Field::zero(); PUBLIC_DATA_TREE_DEPTH],
        }
    }

    #[test]
    fn serde_round_trip() {
        let input = CircuitInput {
            plaintext_fields: [Field::zero(); PLAINTEXT_FIELD_COUNT],
            ciphertext_fields: [Field::zero(); MESSAGE_CIPHERTEXT_LEN + 1],
            app_siloed_viewing_secret: Field::from_u64(1),
            block_number: 10,
            previous_block_number: 9,
            initial_lot_state_root: Field::zero(),
            sell: sample_side(Field::from_u64(2)),
            buy: sample_side(Field::from_u64(3)),
            oracle_address: Field::from_u64(4),
            assets_map_slot: Field::from_u64(5),
            public_data_tree_root: Field::zero(),
            sell_price_witness: sample_witness(),
            buy_price_witness: sample_witness(),
        };
        let json = serde_json::to_string(&input).expect("serialize");
        let back: CircuitInput = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.block_number, input.block_number);
        assert_eq!(back.sell.token, input.sell.token);
    }

    #[test]
    fn combinator_input_serde_round_trip() {
        use super::{ChildArtifact, CombinatorInput};
        use pnl_core::{SwapPublicOutputs, encode_signed_pnl};

        let child = ChildArtifact {
            public_outputs: SwapPublicOutputs {
                leaf_or_root: Field::from_u64(1),
                pnl: encode_signed_pnl(5),
                remaining_lot_state_root: Field::from_u64(2),
                initial_lot_state_root: Field::from_u64(3),
                price_feed_address: Field::from_u64(4),
                block_number: Field::from_u64(100),
            },
            vk_as_fields: vec![Field::from_u64(9)],
            vk_hash: Field::from_u64(9),
        };
        let input = CombinatorInput {
            level: 1,
            left: child.clone(),
            right: Some(child),
        };
        let json = serde_json::to_string(&input).expect("serialize");
        let back: CombinatorInput = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, input);
    }
}
