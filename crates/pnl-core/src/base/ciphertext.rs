//! Swap event ciphertexts and their decrypted plaintext shape.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Number of field elements carried in a ciphertext body (§3).
pub const MESSAGE_CIPHERTEXT_LEN: usize = 17;

/// A discovered, still-encrypted swap event log.
///
/// `tag` is the siloed tag that matched during scanning; the core ignores it
/// after discovery (§3: "The tag is ignored by the core after discovery").
/// `body` is both hashed to produce the Merkle leaf and fed to the circuit
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// The 32-byte tag this ciphertext was discovered under.
    pub tag: [u8; 32],
    /// The encrypted body, `MESSAGE_CIPHERTEXT_LEN` field elements.
    pub body: [Field; MESSAGE_CIPHERTEXT_LEN],
}

impl Ciphertext {
    /// Re-interpret the 32-byte tag as a field element, the convention used
    /// when folding the tag into the ciphertext leaf hash (§4.5 step 12).
    #[must_use]
    pub fn tag_as_field(&self) -> Field {
        Field::from_be_bytes_mod_order(&self.tag)
    }

    /// The full set of field elements fed to the ciphertext leaf hash: the
    /// tag (as a field) followed by the body.
    #[must_use]
    #[allow(clippy::indexing_slicing, reason = "out is a fixed-size array sized to fit tag + body")]
    pub fn leaf_fields(&self) -> [Field; MESSAGE_CIPHERTEXT_LEN.saturating_add(1)] {
        let mut out = [Field::zero(); MESSAGE_CIPHERTEXT_LEN.saturating_add(1)];
        out[0] = self.tag_as_field();
        out[1..].copy_from_slice(&self.body);
        out
    }
}

/// Decrypted plaintext fields for a swap (§3).
///
/// The source ciphertext carries 17 fields; only indices 2..6 are
/// semantically meaningful to this core, so the first two decrypted fields
/// are intentionally not modeled here — callers that need them operate on
/// the raw `[Field; N]` the decryptor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlaintext {
    /// Token address being sold.
    pub token_in: Field,
    /// Token address being bought.
    pub token_out: Field,
    /// Amount sold, bounded to fit a signed 64-bit value once priced.
    pub amount_in: u128,
    /// Amount bought, bounded to fit a signed 64-bit value once priced.
    pub amount_out: u128,
    /// Whether `amount_in` (vs. `amount_out`) was the user-specified input.
    pub is_exact_input: bool,
}

impl SwapPlaintext {
    /// Extract the semantically meaningful fields from a decrypted plaintext
    /// buffer, per the indices fixed in §3 (`token_in`/`token_out` at
    /// indices 2/3, amounts packed into the low 128 bits of indices 4/5,
    /// the exact-input flag as a boolean-as-field at index 6).
    ///
    /// # Errors
    /// Returns [`InvalidPlaintext`] if `fields` is shorter than 7 elements or
    /// an amount does not fit `u128`.
    pub fn from_fields(fields: &[Field]) -> Result<Self, InvalidPlaintext> {
        let field = |idx: usize| fields.get(idx).copied().ok_or(InvalidPlaintext::TooShort);
        let token_in = field(2)?;
        let token_out = field(3)?;
        let amount_in = to_u128(field(4)?)?;
        let amount_out = to_u128(field(5)?)?;
        let is_exact_input = field(6)? != Field::zero();

        Ok(Self {
            token_in,
            token_out,
            amount_in,
            amount_out,
            is_exact_input,
        })
    }
}

fn to_u128(f: Field) -> Result<u128, InvalidPlaintext> {
    f.to_u128().ok_or(InvalidPlaintext::AmountOutOfRange)
}

/// Errors raised extracting [`SwapPlaintext`] from raw decrypted fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidPlaintext {
    /// The decrypted field list was shorter than the fixed layout requires.
    #[error("decrypted plaintext has fewer than 7 fields")]
    TooShort,
    /// An amount field did not fit in `u128`.
    #[error("amount field exceeds u128 range")]
    AmountOutOfRange,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing, reason = "Test code")]

    use super::{InvalidPlaintext, SwapPlaintext};
    use crate::field::Field;

    fn plaintext_fields(amount_in: u128, amount_out: u128, is_exact_input: bool) -> Vec<Field> {
        vec![
            Field::from_u64(0),
            Field::from_u64(0),
            Field::from_u64(10),
            Field::from_u64(20),
            Field::from_u128(amount_in),
            Field::from_u128(amount_out),
            if is_exact_input {
                Field::from_u64(1)
            } else {
                Field::zero()
            },
        ]
    }

    #[test]
    fn extracts_semantically_meaningful_fields() {
        let fields = plaintext_fields(100, 200, true);
        let plaintext = SwapPlaintext::from_fields(&fields).expect("valid plaintext");
        assert_eq!(plaintext.token_in, Field::from_u64(10));
        assert_eq!(plaintext.token_out, Field::from_u64(20));
        assert_eq!(plaintext.amount_in, 100);
        assert_eq!(plaintext.amount_out, 200);
        assert!(plaintext.is_exact_input);
    }

    #[test]
    fn too_short_is_rejected() {
        let fields = vec![Field::zero(); 6];
        assert_eq!(
            SwapPlaintext::from_fields(&fields),
            Err(InvalidPlaintext::TooShort)
        );
    }

    #[test]
    fn amount_out_of_u128_range_is_rejected() {
        let mut fields = plaintext_fields(1, 1, false);
        // A field whose top 16 bytes are non-zero cannot fit in a u128.
        fields[4] = Field::from_be_bytes_mod_order(&[0xff_u8; 32]);
        assert_eq!(
            SwapPlaintext::from_fields(&fields),
            Err(InvalidPlaintext::AmountOutOfRange)
        );
    }
}
