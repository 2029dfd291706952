//! Top-level pipeline orchestration: scan, drive every discovered swap,
//! bootstrap verifier keys, then aggregate into one final proof (§2 "Data
//! flow: node -> C1 -> (C2 + C4) -> C5 -> C6 -> final public outputs").
//!
//! This is the one entry point `pnl-cli` calls; everything else in this
//! crate is a building block it composes.

use std::time::Instant;

use pnl_core::{Field, NodeClient, PipelineConfig, RunSummary, TaggingSecretEntry};
use pnl_lottree::LotStateTree;
use pnl_prover::{ChildArtifact, ProverClient, ProverError};
use pnl_scan::scan_tags;

use crate::aggregator::{FinalArtifact, aggregate, bootstrap_verifier_keys};
use crate::error::{PipelineError, SwapDriveError};
use crate::swap_driver::drive_swap;

/// One tagging-secret entry paired with the app-siloed viewing secret
/// needed to decrypt whatever it discovers.
///
/// §3 draws a line between the tag secret (discovery, C1) and the
/// app-siloed viewing secret (decryption, C2): "Only the `(secret, app)`
/// pair is needed to discover ciphertexts" versus §4.2's `addr_secret`
/// consumed by the decryptor. Deriving one from the other is wallet/account
/// bootstrap machinery and out of scope here (§1), so callers supply both
/// halves directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTarget {
    /// The tagging-secret entry to scan with (`secret`, `app`).
    pub entry: TaggingSecretEntry,
    /// The app-siloed viewing secret to decrypt this entry's hits with.
    pub viewing_secret: Field,
}

/// Run the full pipeline over `targets`: scan every target's tag windows,
/// merge hits into chronological order, drive each swap, bootstrap verifier
/// keys from the first leaf proof, then aggregate (§2, §4.6).
///
/// `oracle_address`/`assets_map_slot` are shared across the whole batch —
/// §8's "same field across all leaves" invariant on `price_feed_address` is
/// a consequence of every swap in one run being driven against the same
/// oracle, not something this function itself needs to check.
///
/// # Errors
/// See [`PipelineError`]: a scan failure, a swap-drive failure (tagged with
/// its chronological index), or an aggregation failure (tagged with its
/// recursion level). Every error is fatal to the run (§7).
pub async fn run_pipeline<Node, Prover>(
    node: &Node,
    prover: &Prover,
    config: &PipelineConfig,
    targets: &[ScanTarget],
    oracle_address: Field,
    assets_map_slot: Field,
) -> Result<(FinalArtifact, RunSummary), PipelineError<Node::Error, Prover::Error>>
where
    Node: NodeClient,
    Prover: ProverClient,
{
    let scan_start = Instant::now();
    let mut discovered = Vec::new();
    for target in targets {
        let hits = scan_tags(
            node,
            target.entry.secret,
            target.entry.app,
            0,
            config.max_indices,
            config.batch_size,
        )
        .await?;
        discovered.extend(hits.into_iter().map(|swap| (swap, target.viewing_secret)));
    }
    // §5 "Ordering guarantees": swaps must be driven in strict chronological
    // block order regardless of which target discovered them. A stable sort
    // preserves each target's own on-chain order for same-block ties.
    discovered.sort_by_key(|(swap, _)| swap.block_number);
    let scan_millis = elapsed_millis(scan_start);

    let drive_start = Instant::now();
    let mut lot_tree = LotStateTree::new();
    let mut previous_block = 0_u64;
    let mut children: Vec<ChildArtifact> = Vec::new();
    let mut verifier_keys = None;
    let mut first_block = None;
    let mut last_block = 0_u64;

    for (index, (swap, viewing_secret)) in discovered.into_iter().enumerate() {
        let driven = drive_swap(
            node,
            prover,
            &mut lot_tree,
            &swap.ciphertext,
            viewing_secret,
            swap.block_number,
            previous_block,
            oracle_address,
            assets_map_slot,
        )
        .await
        .map_err(|source| PipelineError::Swap { index, source })?;

        let Some(artifact) = driven else { continue };
        previous_block = swap.block_number;
        first_block.get_or_insert(swap.block_number);
        last_block = swap.block_number;

        let keys = match &verifier_keys {
            Some(keys) => keys,
            None => {
                let bootstrapped =
                    bootstrap_verifier_keys(prover, &artifact.proof, artifact.public_outputs)
                        .await
                        .map_err(|source| PipelineError::Aggregation { level: 0, source })?;
                verifier_keys.insert(bootstrapped)
            }
        };

        let recursive = prover
            .generate_recursive_proof_artifacts(
                &artifact.proof,
                pnl_core::SWAP_PUBLIC_OUTPUTS_LEN,
            )
            .await
            .map_err(|backend_err| PipelineError::Swap {
                index,
                source: SwapDriveError::Prover(ProverError::Backend(backend_err)),
            })?;

        if !keys.is_admissible(0, recursive.vk_hash) {
            return Err(PipelineError::Swap {
                index,
                source: SwapDriveError::Prover(ProverError::InadmissibleVerifierKey {
                    hash: recursive.vk_hash.to_hex(),
                    level: 0,
                }),
            });
        }

        children.push(ChildArtifact {
            public_outputs: artifact.public_outputs,
            vk_as_fields: recursive.vk_as_fields,
            vk_hash: recursive.vk_hash,
        });
    }
    let swap_drive_millis = elapsed_millis(drive_start);

    let swap_count = u64::try_from(children.len()).unwrap_or(u64::MAX);
    let Some(verifier_keys) = verifier_keys else {
        return Err(PipelineError::Aggregation {
            level: 0,
            source: crate::error::AggregationError::EmptyBatch,
        });
    };

    let agg_start = Instant::now();
    let zero_hash_cache = pnl_lottree::zero_hashes(32);
    let final_artifact = aggregate(prover, &verifier_keys, &zero_hash_cache, children)
        .await
        .map_err(|source| PipelineError::Aggregation { level: 0, source })?;
    let aggregation_millis = elapsed_millis(agg_start);

    let summary = RunSummary {
        swap_count,
        first_block: first_block.unwrap_or(0),
        last_block,
        scan_millis,
        swap_drive_millis,
        aggregation_millis,
    };
    tracing::info!(
        swap_count,
        first_block = summary.first_block,
        last_block,
        "pipeline run complete"
    );

    Ok((final_artifact, summary))
}

fn elapsed_millis(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use async_trait::async_trait;
    use pnl_core::{
        BlockHeader, Ciphertext, Direction, Field, Log, MESSAGE_CIPHERTEXT_LEN, NodeClient,
        PublicDataLeafPreimage, PublicDataWitness, TaggingSecretEntry,
    };
    use pnl_prover::{
        CircuitInput, CombinatorInput, Execution, GeneratedProof, ProverClient,
        RecursiveProofArtifacts, VerifierTarget,
    };
    use pnl_scan::{base_tag, siloed_tag};

    use super::{ScanTarget, run_pipeline};

    /// A node that serves one pre-baked ciphertext at a fixed tag index and
    /// a flat oracle price for every query.
    struct FakeNode {
        secret: Field,
        app: Field,
        index: u64,
        ciphertext: Ciphertext,
        block: u64,
        price: u128,
    }

    #[async_trait]
    impl NodeClient for FakeNode {
        type Error = Infallible;

        async fn get_logs_by_tags(&self, tags: &[Field]) -> Result<Vec<Vec<Log>>, Self::Error> {
            let target = siloed_tag(self.app, base_tag(self.secret, self.index));
            Ok(tags
                .iter()
                .map(|tag| {
                    if *tag == target {
                        vec![Log {
                            ciphertext: self.ciphertext,
                            block_number: self.block,
                        }]
                    } else {
                        Vec::new()
                    }
                })
                .collect())
        }

        async fn get_block_header(&self, _block: u64) -> Result<BlockHeader, Self::Error> {
            Ok(BlockHeader {
                public_data_tree_root: Field::zero(),
                note_hash_tree_root: Field::zero(),
                nullifier_tree_root: Field::zero(),
                next_available_leaf_index: 0,
            })
        }

        async fn get_public_data_witness(
            &self,
            _block: u64,
            index: Field,
        ) -> Result<PublicDataWitness, Self::Error> {
            Ok(PublicDataWitness {
                leaf_preimage: PublicDataLeafPreimage {
                    slot: index,
                    value: Field::from_u128(self.price),
                    next_slot: Field::zero(),
                    next_index: 0,
                },
                index: 0,
                sibling_path: vec![Field::zero(); 40],
            })
        }
    }

    /// A prover that always produces a zero-PnL leaf and a pass-through
    /// combinator, just enough to exercise the pipeline's wiring end to
    /// end.
    struct FakeProver;

    #[async_trait]
    impl ProverClient for FakeProver {
        type Error = Infallible;

        async fn execute(&self, inputs: &CircuitInput) -> Result<Execution, Self::Error> {
            let outputs = pnl_core::SwapPublicOutputs {
                leaf_or_root: Field::from_u64(42),
                pnl: pnl_core::encode_signed_pnl(0),
                remaining_lot_state_root: Field::from_u64(99),
                initial_lot_state_root: inputs.initial_lot_state_root,
                price_feed_address: inputs.oracle_address,
                block_number: Field::from_u64(inputs.block_number),
            };
            Ok(Execution {
                witness: Vec::new(),
                return_values: outputs.to_fields().to_vec(),
            })
        }

        async fn combine(&self, inputs: &CombinatorInput) -> Result<Execution, Self::Error> {
            Ok(Execution {
                witness: Vec::new(),
                return_values: inputs.left.public_outputs.to_fields().to_vec(),
            })
        }

        async fn generate_proof(
            &self,
            _witness: &[u8],
            _target: VerifierTarget,
        ) -> Result<GeneratedProof, Self::Error> {
            Ok(GeneratedProof {
                proof: Vec::new(),
                public_inputs: Vec::new(),
            })
        }

        async fn verify_proof(
            &self,
            _proof: &GeneratedProof,
            _target: VerifierTarget,
        ) -> Result<bool, Self::Error> {
            Ok(true)
        }

        async fn generate_recursive_proof_artifacts(
            &self,
            _proof: &GeneratedProof,
            _n_public_inputs: usize,
        ) -> Result<RecursiveProofArtifacts, Self::Error> {
            Ok(RecursiveProofArtifacts {
                vk_as_fields: vec![Field::from_u64(7)],
                vk_hash: Field::from_u64(7),
            })
        }
    }

    #[tokio::test]
    async fn an_empty_scan_window_yields_an_empty_batch_error() {
        let node = FakeNode {
            secret: Field::from_u64(1),
            app: Field::from_u64(2),
            index: 0,
            ciphertext: Ciphertext {
                tag: [0_u8; 32],
                body: [Field::zero(); MESSAGE_CIPHERTEXT_LEN],
            },
            block: 10,
            price: 100,
        };
        // No target scans this node's one hit, so nothing is discovered.
        let prover = FakeProver;
        let config = pnl_core::PipelineConfig {
            node_endpoint: "n".to_owned(),
            prover_endpoint: "p".to_owned(),
            node_timeout_secs: 1,
            prover_timeout_secs: 1,
            max_indices: 1,
            batch_size: 1,
            leaf_vk_hash: None,
            summary_vk_hash: None,
        };

        let result = run_pipeline(&node, &prover, &config, &[], Field::from_u64(1), Field::from_u64(1)).await;
        assert!(matches!(
            result,
            Err(super::PipelineError::Aggregation { .. })
        ));
    }

    #[tokio::test]
    async fn undecryptable_hits_are_dropped_without_failing_the_run() {
        // A ciphertext built from an all-zero body will very likely fail to
        // decrypt under any nonzero secret; the pipeline must treat that as
        // "nothing discovered" rather than as a fatal error, consistent
        // with §4.2/§7's "silently dropped" contract for undecryptable
        // hits.
        let secret = Field::from_u64(10);
        let app = Field::from_u64(20);
        let node = FakeNode {
            secret,
            app,
            index: 0,
            ciphertext: Ciphertext {
                tag: [0_u8; 32],
                body: [Field::zero(); MESSAGE_CIPHERTEXT_LEN],
            },
            block: 10,
            price: 100,
        };
        let prover = FakeProver;
        let config = pnl_core::PipelineConfig {
            node_endpoint: "n".to_owned(),
            prover_endpoint: "p".to_owned(),
            node_timeout_secs: 1,
            prover_timeout_secs: 1,
            max_indices: 4,
            batch_size: 2,
            leaf_vk_hash: None,
            summary_vk_hash: None,
        };
        let target = ScanTarget {
            entry: TaggingSecretEntry {
                secret,
                app,
                counterparty: Field::zero(),
                direction: Direction::Inbound,
                label: None,
            },
            viewing_secret: Field::from_u64(99),
        };

        let result = run_pipeline(
            &node,
            &prover,
            &config,
            std::slice::from_ref(&target),
            Field::from_u64(1),
            Field::from_u64(1),
        )
        .await;

        // Either the whole batch ends up empty (decrypt failed) or a
        // decrypt error surfaces directly; what must never happen is a
        // false "success with zero swaps but no error".
        assert!(matches!(
            result,
            Err(super::PipelineError::Aggregation { .. })
                | Err(super::PipelineError::Swap { .. })
        ));
    }
}
