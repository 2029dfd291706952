//! An HTTP/JSON [`ProverClient`] implementation.
//!
//! Same rationale as [`crate::node_client::HttpNodeClient`]: §6 treats the
//! proving backend as an external collaborator behind a small, stable API
//! and leaves its wire format unspecified. This is the concrete choice for
//! this deployment — one JSON/HTTP endpoint per trait method.

use std::time::Duration;

use async_trait::async_trait;
use pnl_prover::{
    CircuitInput, CombinatorInput, Execution, GeneratedProof, ProverClient,
    RecursiveProofArtifacts, VerifierTarget,
};
use serde::{Deserialize, Serialize};

/// Errors raised by [`HttpProverClient`]'s RPCs.
#[derive(Debug, thiserror::Error)]
pub enum HttpProverError {
    /// The HTTP request itself failed.
    #[error("prover request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The prover responded with a non-success status code.
    #[error("prover responded with status {status}: {body}")]
    Status {
        /// The HTTP status code returned.
        status: u16,
        /// The response body, for operator diagnostics.
        body: String,
    },
}

/// Talks to a prover backend's JSON/HTTP API at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpProverClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProverClient {
    /// Build a client pointed at `base_url` with a per-request `timeout`
    /// (§5: "Prover timeouts are typically 1-10 minutes").
    ///
    /// # Errors
    /// Returns a [`reqwest::Error`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn post_json<Req: Serialize + ?Sized, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, HttpProverError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpProverError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Resp>().await?)
    }
}

#[derive(Serialize)]
struct ProveRequest<'a> {
    witness: &'a [u8],
    target: VerifierTarget,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    proof: &'a GeneratedProof,
    target: VerifierTarget,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

#[derive(Serialize)]
struct RecursiveArtifactsRequest<'a> {
    proof: &'a GeneratedProof,
    n_public_inputs: usize,
}

#[async_trait]
impl ProverClient for HttpProverClient {
    type Error = HttpProverError;

    async fn execute(&self, inputs: &CircuitInput) -> Result<Execution, Self::Error> {
        self.post_json("/execute", inputs).await
    }

    async fn combine(&self, inputs: &CombinatorInput) -> Result<Execution, Self::Error> {
        self.post_json("/combine", inputs).await
    }

    async fn generate_proof(
        &self,
        witness: &[u8],
        target: VerifierTarget,
    ) -> Result<GeneratedProof, Self::Error> {
        self.post_json("/proofs", &ProveRequest { witness, target })
            .await
    }

    async fn verify_proof(
        &self,
        proof: &GeneratedProof,
        target: VerifierTarget,
    ) -> Result<bool, Self::Error> {
        let response: VerifyResponse = self
            .post_json("/proofs/verify", &VerifyRequest { proof, target })
            .await?;
        Ok(response.valid)
    }

    async fn generate_recursive_proof_artifacts(
        &self,
        proof: &GeneratedProof,
        n_public_inputs: usize,
    ) -> Result<RecursiveProofArtifacts, Self::Error> {
        self.post_json(
            "/proofs/recursive-artifacts",
            &RecursiveArtifactsRequest {
                proof,
                n_public_inputs,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpProverClient;

    #[test]
    fn new_accepts_a_plain_base_url() {
        let client = HttpProverClient::new("http://localhost:9090", Duration::from_secs(600));
        assert!(client.is_ok());
    }
}
