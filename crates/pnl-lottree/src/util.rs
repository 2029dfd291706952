//! Utility layer (C7): incremental Merkle tree, zero-hash cache, and the
//! ciphertext-to-leaf helper.

use pnl_core::{CIPHERTEXT_LEAF, Ciphertext, Field, Hash};

/// Pad `leaves` with zero to the next power of two, then pair-hash level by
/// level until a single root remains.
///
/// `imt(leaves) == imt(leaves ++ [0, 0, ..])` whenever the tail is exactly
/// the padding needed to reach the next power of two (§8 round-trip law).
#[must_use]
pub fn imt(leaves: &[Field]) -> Field {
    let target_len = leaves.len().next_power_of_two().max(1);
    let mut level: Vec<Field> = leaves.to_vec();
    level.resize(target_len, Field::zero());

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair.first().copied().unwrap_or_else(Field::zero);
                let right = pair.get(1).copied().unwrap_or_else(Field::zero);
                Hash::pair(left, right)
            })
            .collect();
    }
    level.first().copied().unwrap_or_else(Field::zero)
}

/// `zero_hashes(max_depth)`: `[zero_hash[0], .., zero_hash[max_depth]]` where
/// `zero_hash[0] = 0` and `zero_hash[l] = H([zero_hash[l-1], zero_hash[l-1]])`.
///
/// Used for the aggregator's odd-arity padding at each level (§4.6, §4.7).
#[must_use]
pub fn zero_hashes(max_depth: usize) -> Vec<Field> {
    let mut hashes = Vec::with_capacity(max_depth.saturating_add(1));
    hashes.push(Field::zero());
    for level in 1..=max_depth {
        let prev = hashes[level.saturating_sub(1)];
        hashes.push(Hash::pair(prev, prev));
    }
    hashes
}

/// Hash a ciphertext's tag-and-body fields into the leaf the swap driver
/// attaches as its per-swap Merkle leaf (§4.5 step 12, §4.7).
///
/// This is `H_s([tag_as_field, body...], CIPHERTEXT_LEAF)`.
#[must_use]
pub fn ciphertext_to_leaf(ciphertext: &Ciphertext) -> Field {
    Hash::compress_with_separator(&ciphertext.leaf_fields(), CIPHERTEXT_LEAF)
}
