//! Shared field, hash, and domain types for the confidential AMM PnL proof
//! orchestrator.
//!
//! This crate has no knowledge of the pipeline's stages; it only defines the
//! vocabulary ([`field::Field`], [`hash::Hash`], and the types in [`base`]
//! and [`schema`]) that every other crate in the workspace speaks.

pub mod base;
pub mod external;
pub mod field;
pub mod hash;
pub mod schema;

pub use base::{
    Ciphertext, Direction, InvalidPlaintext, Lot, MAX_LOTS, MESSAGE_CIPHERTEXT_LEN, SwapPlaintext,
    TaggingSecretEntry, decode_signed_pnl, encode_signed_pnl,
};
pub use external::{BlockHeader, Log, NodeClient, PublicDataLeafPreimage, PublicDataWitness};
pub use field::Field;
pub use hash::{CIPHERTEXT_LEAF, Hash, LEAF_INDEX_SILO};
pub use schema::{
    PipelineConfig, RunSummary, SWAP_PUBLIC_OUTPUTS_LEN, SwapPublicOutputs, TaggingSecretExport,
    WrongOutputCount,
};
