//! An HTTP/JSON [`NodeClient`] implementation.
//!
//! §6 leaves the wire format between the core and the chain-facing node
//! unspecified ("a real gRPC/HTTP client" is named as a documented
//! extension point, §9 "Dynamic typing... serialize to whatever wire format
//! the prover demands at the boundary only" — the same applies to the node
//! boundary). This is this implementation's concrete choice: a small
//! JSON-over-HTTP API, one endpoint per trait method, using `reqwest` the
//! way `zeratul-client` talks to its state-transition server. Decided as an
//! Open Question resolution in `DESIGN.md`.

use std::time::Duration;

use async_trait::async_trait;
use pnl_core::{BlockHeader, Field, Log, NodeClient, PublicDataWitness};
use serde::{Deserialize, Serialize};

/// Errors raised by [`HttpNodeClient`]'s RPCs.
#[derive(Debug, thiserror::Error)]
pub enum HttpNodeError {
    /// The HTTP request itself failed (connection, timeout, TLS, ...).
    #[error("node request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The node responded with a non-success status code.
    #[error("node responded with status {status}: {body}")]
    Status {
        /// The HTTP status code returned.
        status: u16,
        /// The response body, for operator diagnostics.
        body: String,
    },
}

/// Talks to a node's JSON/HTTP API at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpNodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNodeClient {
    /// Build a client pointed at `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns a [`reqwest::Error`] if the underlying HTTP client cannot be
    /// constructed (e.g. TLS backend initialization failure).
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
    ) -> Result<Resp, HttpNodeError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<Resp: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<Resp, HttpNodeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpNodeError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<Resp>().await?)
}

#[derive(Serialize)]
struct LogsByTagsRequest<'a> {
    tags: &'a [Field],
}

#[derive(Deserialize)]
struct LogsByTagsResponse {
    logs: Vec<Vec<Log>>,
}

#[derive(Serialize)]
struct PublicDataWitnessRequest {
    block: u64,
    index: Field,
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    type Error = HttpNodeError;

    async fn get_logs_by_tags(&self, tags: &[Field]) -> Result<Vec<Vec<Log>>, Self::Error> {
        let response: LogsByTagsResponse = self
            .post_json("/tags/logs", &LogsByTagsRequest { tags })
            .await?;
        Ok(response.logs)
    }

    async fn get_block_header(&self, block: u64) -> Result<BlockHeader, Self::Error> {
        let response = self
            .client
            .get(format!("{}/blocks/{block}/header", self.base_url))
            .send()
            .await?;
        read_json(response).await
    }

    async fn get_public_data_witness(
        &self,
        block: u64,
        index: Field,
    ) -> Result<PublicDataWitness, Self::Error> {
        self.post_json(
            "/blocks/public-data-witness",
            &PublicDataWitnessRequest { block, index },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpNodeClient;

    #[test]
    fn new_accepts_a_plain_base_url() {
        let client = HttpNodeClient::new("http://localhost:8080", Duration::from_secs(5));
        assert!(client.is_ok());
    }
}
