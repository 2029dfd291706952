//! Tag-driven event discovery (C1, §4.1).
//!
//! Walks a recipient's tagging-secret windows against a node client that
//! indexes encrypted logs by siloed tag. The app-silo step is mandatory —
//! a scanner that queries bare `base_tag` values against the node matches
//! zero logs (§9, "Observed pitfall").

use pnl_core::{Ciphertext, Field, Hash, NodeClient};
use serde::{Deserialize, Serialize};

/// Errors raised scanning tag windows.
#[derive(Debug, thiserror::Error)]
pub enum ScanError<E> {
    /// The node client's batched tag lookup failed.
    #[error("node RPC failed during tag scan: {0}")]
    Node(#[source] E),
}

/// `base_tag = H([secret, index])` (§3, §4.1).
#[must_use]
pub fn base_tag(secret: Field, index: u64) -> Field {
    Hash::compress(&[secret, Field::from_u64(index)])
}

/// `siloed_tag = H([app, base_tag])` (§3, §4.1).
#[must_use]
pub fn siloed_tag(app: Field, tag: Field) -> Field {
    Hash::compress(&[app, tag])
}

/// A ciphertext discovered by [`scan_tags`], still carrying the block it
/// was emitted in so the swap driver can run its chronology check (§4.5
/// step 3) without a second round-trip to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSwap {
    /// The still-encrypted ciphertext body.
    pub ciphertext: Ciphertext,
    /// The block this ciphertext's log was emitted in.
    pub block_number: u64,
}

/// Walk tag windows `[start_index, start_index + max_indices)` in
/// `batch_size`-sized chunks, stopping at the first window where every tag
/// queried in it returned no logs (§4.1, "no-hit stop").
///
/// Returned ciphertexts are in tag-index order, matching on-chain emission
/// order for this `(secret, app)` pair; duplicate hits under the same tag
/// preserve their relative on-chain order (§4.1, "Guarantees").
///
/// # Errors
/// Propagates the node client's RPC error unchanged.
pub async fn scan_tags<C: NodeClient>(
    node: &C,
    secret: Field,
    app: Field,
    start_index: u64,
    max_indices: u64,
    batch_size: u64,
) -> Result<Vec<DiscoveredSwap>, ScanError<C::Error>> {
    let mut discovered = Vec::new();
    let mut scanned = 0_u64;
    let mut index = start_index;

    while scanned < max_indices {
        let window = batch_size.min(max_indices.saturating_sub(scanned));
        if window == 0 {
            break;
        }

        let tags: Vec<Field> = (0..window)
            .map(|offset| siloed_tag(app, base_tag(secret, index.saturating_add(offset))))
            .collect();

        tracing::debug!(index, window, "querying tag window");
        let logs = node.get_logs_by_tags(&tags).await.map_err(ScanError::Node)?;

        let any_hit = logs.iter().any(|per_tag| !per_tag.is_empty());
        for per_tag in &logs {
            discovered.extend(per_tag.iter().map(|log| DiscoveredSwap {
                ciphertext: log.ciphertext,
                block_number: log.block_number,
            }));
        }

        index = index.saturating_add(window);
        scanned = scanned.saturating_add(window);

        if !any_hit {
            break;
        }
    }

    tracing::info!(count = discovered.len(), "tag scan complete");
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing, reason = "Test code")]

    use std::convert::Infallible;

    use async_trait::async_trait;
    use pnl_core::{BlockHeader, Ciphertext, Field, Log, NodeClient, PublicDataWitness, MESSAGE_CIPHERTEXT_LEN};

    use super::{base_tag, scan_tags, siloed_tag};

    fn ciphertext_for(seed: u64) -> Ciphertext {
        Ciphertext {
            tag: [0_u8; 32],
            body: [Field::from_u64(seed); MESSAGE_CIPHERTEXT_LEN],
        }
    }

    /// A fake node whose hits are keyed by siloed tag, built so tests can
    /// place logs at specific window indices without depending on the real
    /// hash.
    struct FakeNode {
        app: Field,
        secret: Field,
        hits: Vec<(u64, Ciphertext)>,
    }

    #[async_trait]
    impl NodeClient for FakeNode {
        type Error = Infallible;

        async fn get_logs_by_tags(&self, tags: &[Field]) -> Result<Vec<Vec<Log>>, Self::Error> {
            Ok(tags
                .iter()
                .map(|tag| {
                    self.hits
                        .iter()
                        .filter(|(index, _)| siloed_tag(self.app, base_tag(self.secret, *index)) == *tag)
                        .map(|(index, ciphertext)| Log {
                            ciphertext: *ciphertext,
                            block_number: *index,
                        })
                        .collect()
                })
                .collect())
        }

        async fn get_block_header(&self, _block: u64) -> Result<BlockHeader, Self::Error> {
            unimplemented!("not exercised by these tests")
        }

        async fn get_public_data_witness(
            &self,
            _block: u64,
            _index: Field,
        ) -> Result<PublicDataWitness, Self::Error> {
            unimplemented!("not exercised by these tests")
        }
    }

    #[test]
    fn base_tag_and_siloed_tag_are_deterministic() {
        let secret = Field::from_u64(1);
        let app = Field::from_u64(2);
        assert_eq!(base_tag(secret, 5), base_tag(secret, 5));
        assert_eq!(
            siloed_tag(app, base_tag(secret, 5)),
            siloed_tag(app, base_tag(secret, 5))
        );
    }

    #[test]
    fn omitting_the_silo_step_would_not_match_a_siloed_tag() {
        let secret = Field::from_u64(1);
        let app = Field::from_u64(2);
        let bare = base_tag(secret, 5);
        let siloed = siloed_tag(app, bare);
        assert_ne!(bare, siloed, "app silo step must change the tag");
    }

    #[tokio::test]
    async fn stops_at_the_first_empty_window() {
        let secret = Field::from_u64(10);
        let app = Field::from_u64(20);
        let node = FakeNode {
            app,
            secret,
            hits: vec![(0, ciphertext_for(100)), (1, ciphertext_for(101))],
        };

        let found = scan_tags(&node, secret, app, 0, 100, 2)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn respects_max_indices_cap() {
        let secret = Field::from_u64(30);
        let app = Field::from_u64(40);
        // Hits fill every index in range so a no-hit stop never triggers;
        // only the max_indices cap should bound the scan.
        let hits = (0..10).map(|i| (i, ciphertext_for(i))).collect();
        let node = FakeNode { app, secret, hits };

        let found = scan_tags(&node, secret, app, 0, 4, 2)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 4);
    }

    #[tokio::test]
    async fn honors_start_index() {
        let secret = Field::from_u64(50);
        let app = Field::from_u64(60);
        let node = FakeNode {
            app,
            secret,
            hits: vec![(5, ciphertext_for(500))],
        };

        let found = scan_tags(&node, secret, app, 5, 10, 1)
            .await
            .expect("scan succeeds");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ciphertext, ciphertext_for(500));
        assert_eq!(found[0].block_number, 5);
    }

    #[tokio::test]
    async fn no_hits_at_all_returns_empty() {
        let secret = Field::from_u64(70);
        let app = Field::from_u64(80);
        let node = FakeNode {
            app,
            secret,
            hits: Vec::new(),
        };

        let found = scan_tags(&node, secret, app, 0, 10, 3)
            .await
            .expect("scan succeeds");

        assert!(found.is_empty());
    }
}
