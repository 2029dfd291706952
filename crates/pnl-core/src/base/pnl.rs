//! Signed 64-bit PnL encoding into a field element (§4.5 "Numeric policy").

use crate::field::Field;

/// Encode a signed 64-bit PnL as a field element.
///
/// The convention is `pnl_field = (pnl as u64) as F`: the two's-complement
/// bit pattern of `pnl` is reinterpreted as an unsigned 64-bit integer and
/// lifted into the field. Both the circuit and the host use this encoding.
#[must_use]
pub fn encode_signed_pnl(pnl: i64) -> Field {
    let unsigned = u64::from_ne_bytes(pnl.to_ne_bytes());
    Field::from_u64(unsigned)
}

/// Decode a field element produced by [`encode_signed_pnl`] back to a signed
/// 64-bit PnL.
///
/// A field with its high bit set (`field >= 2^63`) is treated as
/// `value - 2^64`, matching the decoder convention in §4.5.
#[must_use]
#[allow(clippy::indexing_slicing, reason = "bytes is a fixed 32-byte array")]
pub fn decode_signed_pnl(field: Field) -> i64 {
    let bytes = field.to_be_bytes();
    let mut low8 = [0_u8; 8];
    low8.copy_from_slice(&bytes[24..32]);
    let unsigned = u64::from_be_bytes(low8);
    i64::from_ne_bytes(unsigned.to_ne_bytes())
}
