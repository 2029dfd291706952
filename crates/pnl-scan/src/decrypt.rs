//! Ciphertext decryption (C2, §4.2).
//!
//! Recovers plaintext fields from a ciphertext body using a shared secret
//! derived by scalar-multiplying an embedded ephemeral curve point by the
//! recipient's app-siloed viewing secret. §4.2 describes this protocol in
//! the abstract and explicitly scopes the core's contract down to one
//! function, `decrypt(body, addr_secret) -> Option<[F; N]>` — "encryption
//! verification inside the circuit is a separate concern." The concrete
//! curve (BN254 itself, reusing [`pnl_core::Field`] as the scalar) and AEAD
//! (AES-128-GCM) are this implementation's stand-in for that abstract
//! protocol, recorded as a decided Open Question in DESIGN.md.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};
use pnl_core::{Field, Hash, MESSAGE_CIPHERTEXT_LEN};

/// Number of plaintext field elements a successful decryption yields.
///
/// The body's 17 fields split as: 1 ephemeral-point x-coordinate, 15
/// ciphertext-data fields, and 1 field carrying the AEAD tag.
pub const PLAINTEXT_FIELDS: usize = MESSAGE_CIPHERTEXT_LEN - 2;

/// Usable bytes per field: 31, skipping the reserved high byte (§3).
const BYTES_PER_FIELD: usize = 31;

/// Byte length of an AES-GCM authentication tag.
const TAG_LEN: usize = 16;

/// Domain separator for the symmetric-key half of the KDF.
const KEY_SEPARATOR: u32 = 101;

/// Domain separator for the nonce half of the KDF.
const NONCE_SEPARATOR: u32 = 102;

/// Errors raised attempting to decrypt a ciphertext body.
///
/// A clean authentication failure is not represented here — it is
/// `Ok(None)` per §4.2/§7 ("undecryptable ciphertexts ... are silently
/// dropped"). This variant covers input so malformed that no decryption
/// attempt could even be made.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecryptError {
    /// The leading field is not a valid curve x-coordinate under either
    /// y-coordinate sign.
    #[error("ephemeral point x-coordinate does not correspond to a curve point")]
    InvalidEphemeralPoint,
}

/// Recover plaintext fields from `body` using `viewing_secret`.
///
/// Tries both y-coordinate signs for the embedded ephemeral point (§4.2:
/// "decryption is re-run with the correct sign if needed") and returns the
/// first one whose AEAD tag verifies. Returns `Ok(None)` if neither sign's
/// shared secret authenticates the payload — the ciphertext belongs to
/// another recipient, or to an event type this core does not decrypt.
///
/// # Errors
/// Returns [`DecryptError::InvalidEphemeralPoint`] if `body[0]` is not a
/// valid x-coordinate for either sign.
#[allow(
    clippy::indexing_slicing,
    reason = "body is a fixed MESSAGE_CIPHERTEXT_LEN array and PLAINTEXT_FIELDS + 2 == MESSAGE_CIPHERTEXT_LEN"
)]
pub fn decrypt(
    body: &[Field; MESSAGE_CIPHERTEXT_LEN],
    viewing_secret: Field,
) -> Result<Option<[Field; PLAINTEXT_FIELDS]>, DecryptError> {
    let ephemeral_x = body[0];
    let ciphertext_bytes = pack_bytes(&body[1..=PLAINTEXT_FIELDS]);
    let tag_bytes = tag_from_field(body[PLAINTEXT_FIELDS.saturating_add(1)]);

    let mut any_point_found = false;
    for greatest in [false, true] {
        let Some(shared) = shared_secret(ephemeral_x, greatest, viewing_secret) else {
            continue;
        };
        any_point_found = true;

        if let Some(plaintext_bytes) = aead_open(shared, &ciphertext_bytes, &tag_bytes) {
            return Ok(Some(unpack_bytes(&plaintext_bytes)));
        }
    }

    if any_point_found {
        Ok(None)
    } else {
        Err(DecryptError::InvalidEphemeralPoint)
    }
}

/// ECDH: reconstruct the ephemeral point from its x-coordinate under
/// `greatest`, then scalar-multiply by `viewing_secret`, returning the
/// result's x-coordinate lifted into [`Field`].
fn shared_secret(ephemeral_x: Field, greatest: bool, viewing_secret: Field) -> Option<Field> {
    let x = ark_bn254::Fq::from_be_bytes_mod_order(&ephemeral_x.to_be_bytes());
    let ephemeral_point = ark_bn254::G1Affine::get_point_from_x_unchecked(x, greatest)?;
    let shared_point = ephemeral_point
        .mul_bigint((*viewing_secret.inner()).into_bigint())
        .into_affine();
    Some(Field::from_be_bytes_mod_order(
        &shared_point.x.into_bigint().to_bytes_be(),
    ))
}

/// Derive a 32-byte KDF output from the shared secret and a domain
/// separator, via the shared Poseidon-based hash (§3 "Hash" parameterized
/// variant).
fn kdf(shared_secret: Field, separator: u32) -> [u8; 32] {
    Hash::compress_with_separator(&[shared_secret], separator).to_be_bytes()
}

#[allow(
    clippy::indexing_slicing,
    reason = "kdf() returns a fixed 32-byte array; the sliced ranges are compile-time constants within bounds"
)]
fn aead_open(shared_secret: Field, ciphertext: &[u8], tag: &[u8; TAG_LEN]) -> Option<Vec<u8>> {
    let key_bytes = kdf(shared_secret, KEY_SEPARATOR);
    let nonce_bytes = kdf(shared_secret, NONCE_SEPARATOR);
    let key = Key::<Aes128Gcm>::from_slice(&key_bytes[16..32]);
    let nonce = Nonce::from_slice(&nonce_bytes[20..32]);
    let cipher = Aes128Gcm::new(key);

    let mut combined = Vec::with_capacity(ciphertext.len().saturating_add(TAG_LEN));
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);
    cipher.decrypt(nonce, combined.as_slice()).ok()
}

#[allow(
    clippy::indexing_slicing,
    reason = "field bytes are a fixed 32-byte array; [16..32] is a compile-time-bounded slice"
)]
fn tag_from_field(field: Field) -> [u8; TAG_LEN] {
    let bytes = field.to_be_bytes();
    let mut tag = [0_u8; TAG_LEN];
    tag.copy_from_slice(&bytes[16..32]);
    tag
}

/// Pack fields into bytes, 31 usable bytes per field (dropping the reserved
/// high byte) (§3).
#[allow(
    clippy::indexing_slicing,
    reason = "field bytes are a fixed 32-byte array; [1..] is the fixed 31-byte usable suffix"
)]
fn pack_bytes(fields: &[Field]) -> Vec<u8> {
    let mut out = Vec::with_capacity(fields.len().saturating_mul(BYTES_PER_FIELD));
    for field in fields {
        let bytes = field.to_be_bytes();
        out.extend_from_slice(&bytes[1..]);
    }
    out
}

/// Inverse of [`pack_bytes`]: re-pack a 31-bytes-per-field byte stream back
/// into field elements, restoring the dropped high byte as zero.
#[allow(
    clippy::indexing_slicing,
    reason = "buf is a fixed 32-byte array and chunk.len() <= BYTES_PER_FIELD == 31"
)]
fn unpack_bytes(bytes: &[u8]) -> [Field; PLAINTEXT_FIELDS] {
    let mut out = [Field::zero(); PLAINTEXT_FIELDS];
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks(BYTES_PER_FIELD)) {
        let mut buf = [0_u8; 32];
        buf[32_usize.saturating_sub(chunk.len())..].copy_from_slice(chunk);
        *slot = Field::from_be_bytes_mod_order(&buf);
    }
    out
}
