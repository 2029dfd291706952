//! Tag-window scanning (C1) and ciphertext decryption (C2).
//!
//! Both components are pure functions/async functions over a
//! [`pnl_core::NodeClient`]; neither holds state across calls. The swap
//! driver in `pnl-sdk` composes them with the lot-state tree and oracle
//! witness assembler.

pub mod decrypt;
pub mod scanner;

pub use decrypt::{decrypt, DecryptError, PLAINTEXT_FIELDS};
pub use scanner::{DiscoveredSwap, ScanError, base_tag, scan_tags, siloed_tag};
