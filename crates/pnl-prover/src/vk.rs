//! Verifier-key bootstrap and admissibility (§4.6 "Verifier-key bootstrap").
//!
//! The first individual proof produced by the external backend yields
//! `LEAF_VK`; the first summary proof (run once, throwaway, before real
//! aggregation begins) yields `SUMMARY_VK`. Level 0 of the aggregator only
//! ever checks against `LEAF_VK`; levels >= 1 check against `SUMMARY_VK`,
//! which is why the summary-vk-hash assertion is a pass-through at level 0
//! (the chicken-and-egg problem §4.6 describes).

use pnl_core::Field;

/// A verifier key extracted from a proof: its field encoding and its hash,
/// as returned by [`crate::ProverClient::generate_recursive_proof_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierKey {
    /// The verifier key's field-element encoding.
    pub vk_as_fields: Vec<Field>,
    /// The verifier key's hash, asserted in-circuit against the admissible
    /// set.
    pub vk_hash: Field,
}

/// The two admissible verifier keys for the aggregation tree (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissibleVerifierKeys {
    /// Individual-swap circuit verifier key, checked at level 0.
    pub leaf_vk: VerifierKey,
    /// Combinator circuit verifier key, checked at levels >= 1.
    pub summary_vk: VerifierKey,
}

impl AdmissibleVerifierKeys {
    /// Whether `hash` matches the admissible key for `level` (`leaf_vk` at
    /// level 0, `summary_vk` otherwise). Level 0 additionally never rejects
    /// a `summary_vk_hash` pass-through — callers skip this check entirely
    /// at level 0 for the summary side, per §4.6.
    #[must_use]
    pub fn is_admissible(&self, level: u32, hash: Field) -> bool {
        if level == 0 {
            hash == self.leaf_vk.vk_hash
        } else {
            hash == self.summary_vk.vk_hash
        }
    }
}
