//! Poseidon-based hashing over the BN254 scalar field.
//!
//! A "Poseidon2" permutation, `H(F*) -> F`, taking an arbitrary-length
//! input, is assumed available. `light-poseidon`'s
//! circomlib-compatible hasher only accepts 1 to 16 field elements per
//! call, so arbitrary-length inputs here (the 66-field lot leaf preimage in
//! particular) are absorbed through a Merkle-Damgård chain over the 2-ary
//! permutation rather than one wide call — the concrete stand-in recorded
//! in DESIGN.md. [`Hash::pair`] is the raw 2-ary primitive; Merkle trees
//! combine children with it directly, while [`Hash::compress`] chains it to
//! absorb however many inputs it's given.

use light_poseidon::{Poseidon, PoseidonHasher};

use crate::field::Field;

/// Domain separator for a public-data-tree leaf index (§3, §4.4).
pub const LEAF_INDEX_SILO: u32 = 23;

/// Domain separator for the per-swap ciphertext leaf (§4.5 step 12, §4.7).
pub const CIPHERTEXT_LEAF: u32 = 0;

/// A namespace for the hash entry points the rest of the pipeline uses.
///
/// There is no state to hold: `light-poseidon`'s hasher is cheap to build
/// per call and is not `Send`-shared across awaits, so we build one on each
/// invocation rather than caching it on a struct.
pub struct Hash;

impl Hash {
    /// The 2-ary Poseidon permutation, `H([left, right]) -> F`.
    ///
    /// This is the Merkle pair-combine primitive used by the lot-state
    /// tree, the aggregator's summary root, and the zero-hash recursion.
    ///
    /// # Panics
    /// Panics if `light-poseidon` rejects a width-2 hasher, which would
    /// indicate the dependency itself is broken, not a caller error.
    #[must_use]
    pub fn pair(left: Field, right: Field) -> Field {
        let mut hasher =
            Poseidon::<ark_bn254::Fr>::new_circom(2).expect("width-2 poseidon is supported");
        let out = hasher
            .hash(&[*left.inner(), *right.inner()])
            .expect("poseidon hash over two inputs does not fail");
        Field::from_inner(out)
    }

    /// `H(inputs) -> F`: absorb an arbitrary-length, non-empty input slice
    /// by chaining [`Hash::pair`] Merkle-Damgård style, starting from
    /// [`Field::zero`].
    ///
    /// # Panics
    /// Panics if `inputs` is empty; every call site in this workspace uses
    /// a fixed, known-non-empty input length.
    #[must_use]
    pub fn compress(inputs: &[Field]) -> Field {
        assert!(!inputs.is_empty(), "compress requires at least one input");
        let mut acc = Field::zero();
        for &input in inputs {
            acc = Self::pair(acc, input);
        }
        acc
    }

    /// `H_s(inputs, separator) -> F`, the domain-separated variant.
    ///
    /// The separator is absorbed as an extra field element ahead of
    /// `inputs`, matching the convention that a siloed/indexed computation
    /// is "the separator, then the payload" (see [`LEAF_INDEX_SILO`] usage
    /// in `pnl-oracle` and [`CIPHERTEXT_LEAF`] usage in the swap driver).
    #[must_use]
    pub fn compress_with_separator(inputs: &[Field], separator: u32) -> Field {
        let mut with_sep = Vec::with_capacity(inputs.len().saturating_add(1));
        with_sep.push(Field::from_u64(u64::from(separator)));
        with_sep.extend_from_slice(inputs);
        Self::compress(&with_sep)
    }
}
