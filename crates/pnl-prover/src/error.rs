//! Errors produced while driving the [`crate::ProverClient`] boundary.

/// Errors surfaced while executing or proving a circuit (§4.5 step 13-14,
/// §4.6).
#[derive(Debug, thiserror::Error)]
pub enum ProverError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The backend rejected the request or failed internally.
    #[error("prover backend: {0}")]
    Backend(#[source] E),
    /// A generated proof failed its own verification. Per §4.5, an
    /// unprovable swap is a fatal condition for the run.
    #[error("proof failed verification")]
    ProofRejected,
    /// A verifier-key hash produced by the backend was not in the
    /// admissible set for the requested level (§4.6).
    #[error("verifier key hash {hash} is not admissible at level {level}")]
    InadmissibleVerifierKey {
        /// The offending hash.
        hash: String,
        /// The aggregation level it was checked at.
        level: u32,
    },
}
