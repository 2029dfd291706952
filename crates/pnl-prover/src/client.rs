//! The prover-backend interface (§6 "External interfaces, consumed").
//!
//! Implementations are out of scope for this core (§1); production wiring
//! (a real recursive SNARK backend) is a documented extension point.

use async_trait::async_trait;
use pnl_core::Field;
use serde::{Deserialize, Serialize};

use crate::circuit_input::{CircuitInput, CombinatorInput};

/// A circuit identity the prover backend can execute or prove against.
///
/// §6 names this parameter `verifier_target` on `generate_proof` and
/// `verify_proof`; the swap circuit and the combinator circuit are the two
/// targets this core ever asks for (§4.5, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierTarget {
    /// The individual-swap circuit (§4.5).
    Leaf,
    /// The binary combinator circuit (§4.6).
    Summary,
}

/// A circuit's witness together with its declared return values, as
/// produced by [`ProverClient::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Opaque witness blob, passed back into [`ProverClient::generate_proof`].
    pub witness: Vec<u8>,
    /// The circuit's public return values.
    pub return_values: Vec<Field>,
}

/// A generated proof together with its public inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProof {
    /// The opaque proof bytes.
    pub proof: Vec<u8>,
    /// The public inputs bound to `proof`.
    pub public_inputs: Vec<Field>,
}

/// Recursion artifacts extracted from a proof for use as the next level's
/// circuit input (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveProofArtifacts {
    /// The verifier key, encoded as field elements for in-circuit use.
    pub vk_as_fields: Vec<Field>,
    /// The verifier key's hash, asserted in-circuit against the admissible
    /// set (§4.6).
    pub vk_hash: Field,
}

/// The external proving-backend interface the core consumes (§6).
#[async_trait]
pub trait ProverClient: Send + Sync {
    /// The error type returned by this backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run the swap circuit over `inputs`, producing a witness and the
    /// circuit's public return values without generating a proof (§4.5 step
    /// 13, §6).
    async fn execute(&self, inputs: &CircuitInput) -> Result<Execution, Self::Error>;

    /// Run the combinator circuit over `inputs`, producing a witness and the
    /// combined six public outputs (§4.6, §6).
    async fn combine(&self, inputs: &CombinatorInput) -> Result<Execution, Self::Error>;

    /// Generate a proof for `witness` against `target` (§6).
    async fn generate_proof(
        &self,
        witness: &[u8],
        target: VerifierTarget,
    ) -> Result<GeneratedProof, Self::Error>;

    /// Verify `proof` against `target` (§6).
    async fn verify_proof(
        &self,
        proof: &GeneratedProof,
        target: VerifierTarget,
    ) -> Result<bool, Self::Error>;

    /// Extract recursion artifacts from `proof`, whose public-input count is
    /// `n_public_inputs` (§4.6, §6).
    async fn generate_recursive_proof_artifacts(
        &self,
        proof: &GeneratedProof,
        n_public_inputs: usize,
    ) -> Result<RecursiveProofArtifacts, Self::Error>;
}
