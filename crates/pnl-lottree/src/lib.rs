//! Lot-state Merkle tree (C3) and Merkle/zero-hash utility layer (C7).

pub mod tree;
pub mod util;

pub use tree::{H_LOT, LotStateTree, LotTreeError, NUM_SLOTS};
pub use util::{ciphertext_to_leaf, imt, zero_hashes};
