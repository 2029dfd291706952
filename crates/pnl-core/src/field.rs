//! BN254 scalar field element used throughout the pipeline.

use std::fmt;
use std::str::FromStr;

use ark_ff::{BigInteger, PrimeField};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An element of the BN254 scalar field.
///
/// Every hash, Merkle node, and circuit-visible value in this system is a
/// `Field`. The type wraps `ark_bn254::Fr` and exposes only the operations
/// the host actually needs: construction, equality, big-endian byte
/// round-tripping, and hex display.
#[derive(Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Field(ark_bn254::Fr);

/// Error returned when a byte sequence does not encode a canonical field
/// element (i.e. the integer it represents is `>= MODULUS`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0:?} is not a canonical BN254 scalar (must be < field modulus)")]
pub struct NonCanonicalField([u8; 32]);

impl Field {
    /// The additive identity.
    #[must_use]
    pub fn zero() -> Self {
        Self(ark_bn254::Fr::from(0_u64))
    }

    /// Build a field element from an unsigned 128-bit integer.
    #[must_use]
    pub fn from_u128(v: u128) -> Self {
        Self(ark_bn254::Fr::from(v))
    }

    /// Build a field element from an unsigned 64-bit integer.
    #[must_use]
    pub fn from_u64(v: u64) -> Self {
        Self(ark_bn254::Fr::from(v))
    }

    /// Construct from the raw `ark_bn254::Fr` representation.
    #[must_use]
    pub const fn from_inner(inner: ark_bn254::Fr) -> Self {
        Self(inner)
    }

    /// Borrow the raw `ark_bn254::Fr` representation, for crates that need
    /// to drive curve arithmetic directly (e.g. the hash backend).
    #[must_use]
    pub const fn inner(&self) -> &ark_bn254::Fr {
        &self.0
    }

    /// Big-endian, 32-byte canonical encoding.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut bytes = self.0.into_bigint().to_bytes_be();
        // `to_bytes_be` on a BN254 Fr always yields 32 bytes, but guard
        // against a shorter representation for the zero element.
        while bytes.len() < 32 {
            bytes.insert(0, 0);
        }
        let mut out = [0_u8; 32];
        out.copy_from_slice(&bytes);
        out
    }

    /// Parse a big-endian 32-byte canonical encoding.
    ///
    /// # Errors
    /// Returns [`NonCanonicalField`] if the bytes represent an integer
    /// `>= MODULUS`.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Result<Self, NonCanonicalField> {
        let fr = ark_bn254::Fr::from_be_bytes_mod_order(&bytes);
        if fr.into_bigint().to_bytes_be() == bytes.to_vec() {
            Ok(Self(fr))
        } else {
            Err(NonCanonicalField(bytes))
        }
    }

    /// Reduce an arbitrary big-endian byte string modulo the field order.
    ///
    /// Unlike [`Field::from_be_bytes`] this never fails; it is used where the
    /// input is already known to be a hash digest or a ciphertext chunk that
    /// must simply be brought into the field, not validated as canonical.
    #[must_use]
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(ark_bn254::Fr::from_be_bytes_mod_order(bytes))
    }

    /// Lowercase hex string, `0x`-prefixed, 64 hex digits.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("0x{}", hex::encode(self.to_be_bytes()))
    }

    /// Interpret this field element as an unsigned 128-bit integer, if its
    /// value is small enough to fit (§4.5 "Numeric policy": amounts and
    /// prices are `u128` on the host).
    ///
    /// Returns `None` if the top 16 bytes of the canonical big-endian
    /// encoding are non-zero.
    #[must_use]
    #[allow(clippy::indexing_slicing, reason = "to_be_bytes is a fixed 32-byte array; split_at(16) is in range")]
    pub fn to_u128(self) -> Option<u128> {
        let bytes = self.to_be_bytes();
        let (high, low) = bytes.split_at(16);
        if high.iter().any(|&b| b != 0) {
            return None;
        }
        let mut arr = [0_u8; 16];
        arr.copy_from_slice(low);
        Some(u128::from_be_bytes(arr))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.to_hex())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Error returned when parsing a `Field` from a string fails.
#[derive(Debug, thiserror::Error)]
pub enum FieldParseError {
    /// The string was not valid hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The hex decoded to something other than 32 bytes.
    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
    /// The bytes decoded but did not represent a canonical field element.
    #[error(transparent)]
    NonCanonical(#[from] NonCanonicalField),
}

impl FromStr for Field {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        let arr: [u8; 32] = bytes
            .clone()
            .try_into()
            .map_err(|_| FieldParseError::WrongLength(bytes.len()))?;
        Ok(Self::from_be_bytes(arr)?)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Field {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "Field".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        <String as JsonSchema>::json_schema(generator)
    }
}

impl std::ops::Add for Field {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Field {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Field {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}
