//! Prover-backend client interface and circuit input records (C3, §4.5, §4.6,
//! §6).
//!
//! This crate defines the shape of the boundary between the orchestrator and
//! whatever recursive-SNARK backend proves the swap and combinator circuits.
//! It does not implement a prover: that is out of scope (§1), left as a
//! documented extension point behind [`ProverClient`].

mod circuit_input;
mod client;
mod error;
mod vk;

pub use circuit_input::{
    ChildArtifact, CircuitInput, CombinatorInput, LotSideWitness, PLAINTEXT_FIELD_COUNT,
    PUBLIC_DATA_TREE_DEPTH,
};
pub use client::{Execution, GeneratedProof, ProverClient, RecursiveProofArtifacts, VerifierTarget};
pub use error::ProverError;
pub use vk::{AdmissibleVerifierKeys, VerifierKey};
