//! The six public outputs produced by a leaf swap proof or a summary proof
//! (§3, §4.6).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::base::decode_signed_pnl;
use crate::field::Field;

/// Public outputs shared by individual swap proofs and summary proofs.
///
/// Same six-field shape "regardless of input swap count" (§6). For a leaf
/// proof, `leaf_or_root` is the ciphertext leaf hash; for a summary proof it
/// is the Merkle combination of its children's `leaf_or_root` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SwapPublicOutputs {
    /// Ciphertext leaf hash (leaf proof) or Merkle root (summary proof).
    pub leaf_or_root: Field,
    /// Signed 64-bit PnL, encoded per [`crate::base::encode_signed_pnl`].
    pub pnl: Field,
    /// Lot-state root after this proof's swap(s).
    pub remaining_lot_state_root: Field,
    /// Lot-state root before this proof's swap(s).
    pub initial_lot_state_root: Field,
    /// The price-oracle contract address shared by every swap aggregated.
    pub price_feed_address: Field,
    /// The (maximum, for a summary) block number covered.
    pub block_number: Field,
}

/// Number of fields in [`SwapPublicOutputs`]'s wire shape (§3, §6).
pub const SWAP_PUBLIC_OUTPUTS_LEN: usize = 6;

/// Error returned when a prover's declared return-value vector does not have
/// exactly [`SWAP_PUBLIC_OUTPUTS_LEN`] fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("expected {SWAP_PUBLIC_OUTPUTS_LEN} public output fields, got {0}")]
pub struct WrongOutputCount(pub usize);

impl SwapPublicOutputs {
    /// Decode [`SwapPublicOutputs::pnl`] back to a signed 64-bit integer.
    #[must_use]
    pub fn signed_pnl(&self) -> i64 {
        decode_signed_pnl(self.pnl)
    }

    /// Parse the fixed six-field shape a circuit execution declares as its
    /// return values (§6 `execute(inputs) -> (witness, return_values: [F])`).
    ///
    /// # Errors
    /// Returns [`WrongOutputCount`] if `fields` is not exactly
    /// [`SWAP_PUBLIC_OUTPUTS_LEN`] long.
    pub fn from_fields(fields: &[Field]) -> Result<Self, WrongOutputCount> {
        let [leaf_or_root, pnl, remaining_lot_state_root, initial_lot_state_root, price_feed_address, block_number] =
            <[Field; SWAP_PUBLIC_OUTPUTS_LEN]>::try_from(fields)
                .map_err(|_| WrongOutputCount(fields.len()))?;
        Ok(Self {
            leaf_or_root,
            pnl,
            remaining_lot_state_root,
            initial_lot_state_root,
            price_feed_address,
            block_number,
        })
    }

    /// The fixed six-field wire shape, in the order fixed by §3.
    #[must_use]
    pub fn to_fields(self) -> [Field; SWAP_PUBLIC_OUTPUTS_LEN] {
        [
            self.leaf_or_root,
            self.pnl,
            self.remaining_lot_state_root,
            self.initial_lot_state_root,
            self.price_feed_address,
            self.block_number,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::SwapPublicOutputs;
    use crate::base::encode_signed_pnl;
    use crate::field::Field;

    #[test]
    fn signed_pnl_decodes_the_pnl_field() {
        let outputs = SwapPublicOutputs {
            leaf_or_root: Field::from_u64(1),
            pnl: encode_signed_pnl(-42),
            remaining_lot_state_root: Field::zero(),
            initial_lot_state_root: Field::zero(),
            price_feed_address: Field::from_u64(7),
            block_number: Field::from_u64(100),
        };
        assert_eq!(outputs.signed_pnl(), -42);
    }

    #[test]
    fn serde_round_trip() {
        let outputs = SwapPublicOutputs {
            leaf_or_root: Field::from_u64(1),
            pnl: encode_signed_pnl(10),
            remaining_lot_state_root: Field::from_u64(2),
            initial_lot_state_root: Field::from_u64(3),
            price_feed_address: Field::from_u64(4),
            block_number: Field::from_u64(5),
        };
        let json = serde_json::to_string(&outputs).expect("serialize");
        let back: SwapPublicOutputs = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, outputs);
    }

    #[test]
    fn to_fields_then_from_fields_round_trips() {
        let outputs = SwapPublicOutputs {
            leaf_or_root: Field::from_u64(1),
            pnl: encode_signed_pnl(-7),
            remaining_lot_state_root: Field::from_u64(2),
            initial_lot_state_root: Field::from_u64(3),
            price_feed_address: Field::from_u64(4),
            block_number: Field::from_u64(5),
        };
        let back = SwapPublicOutputs::from_fields(&outputs.to_fields()).expect("six fields");
        assert_eq!(back, outputs);
    }

    #[test]
    fn from_fields_rejects_the_wrong_length() {
        let fields = vec![Field::zero(); 5];
        assert_eq!(
            SwapPublicOutputs::from_fields(&fields),
            Err(super::WrongOutputCount(5))
        );
    }
}
