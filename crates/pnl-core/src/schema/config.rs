//! Pipeline-wide run configuration.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Configuration shared across a single pipeline run: endpoints, timeouts,
/// scan bounds, and the verifier keys the aggregator will admit.
///
/// Loadable from a JSON/TOML file; `pnl-cli` additionally layers
/// environment-variable overrides on top via `clap`'s `env` attribute before
/// handing a `PipelineConfig` to the SDK.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfig {
    /// Node client endpoint (tag lookups, block headers, public-data
    /// witnesses).
    pub node_endpoint: String,
    /// Prover backend endpoint (execute/prove/verify/vk-extraction).
    pub prover_endpoint: String,
    /// Per-call timeout for node RPCs, in seconds.
    #[serde(default = "PipelineConfig::default_node_timeout_secs")]
    pub node_timeout_secs: u64,
    /// Per-call timeout for prover RPCs, in seconds (§5: "typically 1-10
    /// minutes").
    #[serde(default = "PipelineConfig::default_prover_timeout_secs")]
    pub prover_timeout_secs: u64,
    /// Ceiling on the number of tag-window indices a single scan will walk
    /// (§4.1).
    #[serde(default = "PipelineConfig::default_max_indices")]
    pub max_indices: u64,
    /// Number of tag indices queried per node round-trip (§4.1).
    #[serde(default = "PipelineConfig::default_batch_size")]
    pub batch_size: u64,
    /// Verifier-key hash admissible for level-0 (leaf) proofs, once
    /// bootstrapped (§4.6). `None` until the first leaf proof has been
    /// produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_vk_hash: Option<Field>,
    /// Verifier-key hash admissible for level-1-and-above (summary) proofs,
    /// once bootstrapped (§4.6). `None` until the throwaway summary
    /// execution has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_vk_hash: Option<Field>,
}

impl PipelineConfig {
    const fn default_node_timeout_secs() -> u64 {
        30
    }

    const fn default_prover_timeout_secs() -> u64 {
        600
    }

    const fn default_max_indices() -> u64 {
        10_000
    }

    const fn default_batch_size() -> u64 {
        32
    }

    /// The configured node RPC timeout as a [`Duration`].
    #[must_use]
    pub const fn node_timeout(&self) -> Duration {
        Duration::from_secs(self.node_timeout_secs)
    }

    /// The configured prover RPC timeout as a [`Duration`].
    #[must_use]
    pub const fn prover_timeout(&self) -> Duration {
        Duration::from_secs(self.prover_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;

    #[test]
    fn defaults_fill_in_missing_optional_fields() {
        let json = r#"{"node_endpoint":"http://node","prover_endpoint":"http://prover"}"#;
        let config: PipelineConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.node_timeout_secs, 30);
        assert_eq!(config.prover_timeout_secs, 600);
        assert_eq!(config.max_indices, 10_000);
        assert_eq!(config.batch_size, 32);
        assert!(config.leaf_vk_hash.is_none());
        assert!(config.summary_vk_hash.is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let json = r#"{
            "node_endpoint":"http://node",
            "prover_endpoint":"http://prover",
            "node_timeout_secs":5,
            "prover_timeout_secs":120,
            "max_indices":1000,
            "batch_size":16
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).expect("deserialize");
        let back = serde_json::to_string(&config).expect("serialize");
        let reparsed: PipelineConfig = serde_json::from_str(&back).expect("reparse");
        assert_eq!(reparsed.node_timeout_secs, 5);
        assert_eq!(reparsed.batch_size, 16);
    }
}
