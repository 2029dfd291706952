//! Foundational domain types shared by every pipeline crate.

mod ciphertext;
mod lot;
mod pnl;
mod tagging_secret;

pub use ciphertext::{Ciphertext, InvalidPlaintext, MESSAGE_CIPHERTEXT_LEN, SwapPlaintext};
pub use lot::{Lot, MAX_LOTS};
pub use pnl::{decode_signed_pnl, encode_signed_pnl};
pub use tagging_secret::{Direction, TaggingSecretEntry};
