//! The node client interface (§6 "External interfaces, consumed").
//!
//! `NodeClient` is the one boundary shared by the tag scanner (C1), the
//! oracle-witness assembler (C4), and the swap driver (C5, which needs both
//! block headers and public-data witnesses). Defining it here rather than
//! splitting it across those crates avoids a dependency cycle between
//! `pnl-scan` and `pnl-oracle` — recorded as a decided Open Question in
//! DESIGN.md. The prover-backend interface has no such cross-cutting
//! consumer and lives in `pnl-prover` instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::base::Ciphertext;
use crate::field::Field;

/// One discovered, still-encrypted log returned by a tag lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// The raw ciphertext buffer as stored on-chain.
    pub ciphertext: Ciphertext,
    /// The block this log was emitted in, needed by the swap driver's
    /// chronology check (§4.5 step 3) and carried no further than that.
    pub block_number: u64,
}

/// The subset of a block header the core needs (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Root of the public-data tree at this block.
    pub public_data_tree_root: Field,
    /// Root of the note-hash tree at this block.
    pub note_hash_tree_root: Field,
    /// Root of the nullifier tree at this block.
    pub nullifier_tree_root: Field,
    /// Next available leaf index in the note-hash tree.
    pub next_available_leaf_index: u64,
}

/// The four-field preimage of an indexed public-data-tree leaf (§4.4, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDataLeafPreimage {
    /// The leaf's storage slot.
    pub slot: Field,
    /// The value stored at `slot`.
    pub value: Field,
    /// The next-higher slot in the indexed tree's sorted order.
    pub next_slot: Field,
    /// The index of `next_slot`'s leaf.
    pub next_index: u64,
}

/// A membership/non-membership witness against the public-data tree at a
/// given block (§4.4, §6, GLOSSARY "Indexed tree").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDataWitness {
    /// The leaf preimage at `index`.
    pub leaf_preimage: PublicDataLeafPreimage,
    /// The tree index this witness was fetched for.
    pub index: u64,
    /// Sibling path from `index` to the public-data-tree root.
    pub sibling_path: Vec<Field>,
}

/// The chain-facing node interface the core consumes (§6).
///
/// Implementations are out of scope for this core (§1); production wiring
/// (a real gRPC/HTTP client) is a documented extension point. `pnl-cli`
/// wires an in-memory fake behind this trait for its integration tests.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// The error type returned by this client's RPCs.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Batch tag lookup: one ordered log list per queried tag, in tag order
    /// (§4.1, §6).
    async fn get_logs_by_tags(&self, tags: &[Field]) -> Result<Vec<Vec<Log>>, Self::Error>;

    /// Fetch the header fields the core needs for `block` (§6).
    async fn get_block_header(&self, block: u64) -> Result<BlockHeader, Self::Error>;

    /// Fetch the public-data-tree witness for `index` at `block` (§4.4, §6).
    async fn get_public_data_witness(
        &self,
        block: u64,
        index: Field,
    ) -> Result<PublicDataWitness, Self::Error>;
}
