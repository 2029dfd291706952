//! Oracle-witness assembler (C4): maps `(oracle, token)` to a public-data
//! tree index and fetches the membership/non-membership witness for it.

use pnl_core::{Field, Hash, LEAF_INDEX_SILO, NodeClient, PublicDataWitness};

/// Errors raised assembling an oracle witness.
#[derive(Debug, thiserror::Error)]
pub enum OracleError<E> {
    /// The node client's RPC failed.
    #[error("node RPC failed fetching oracle witness: {0}")]
    Node(#[source] E),
}

/// The witness the circuit needs for one `(oracle, token)` price lookup at a
/// given block, together with the tree index it was fetched at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleWitness {
    /// The public-data-tree index this witness was fetched for
    /// (`H_s([oracle, H([assets_map_slot, token])], LEAF_INDEX_SILO)`).
    pub tree_index: Field,
    /// The membership/non-membership witness returned by the node.
    pub witness: PublicDataWitness,
}

/// `derived_map_slot = H([assets_map_slot, token])` (§4.4).
#[must_use]
pub fn derived_map_slot(assets_map_slot: Field, token: Field) -> Field {
    Hash::compress(&[assets_map_slot, token])
}

/// `tree_index = H_s([oracle, derived_map_slot], LEAF_INDEX_SILO)` (§4.4).
#[must_use]
pub fn tree_index(oracle: Field, assets_map_slot: Field, token: Field) -> Field {
    let slot = derived_map_slot(assets_map_slot, token);
    Hash::compress_with_separator(&[oracle, slot], LEAF_INDEX_SILO)
}

/// Fetch the oracle witness for `token`'s price under `oracle` at `block`.
///
/// # Errors
/// Returns [`OracleError::Node`] if the underlying node RPC fails.
pub async fn fetch_oracle_witness<C: NodeClient>(
    node: &C,
    oracle: Field,
    assets_map_slot: Field,
    token: Field,
    block: u64,
) -> Result<OracleWitness, OracleError<C::Error>> {
    let index = tree_index(oracle, assets_map_slot, token);
    tracing::debug!(%block, "fetching oracle witness");
    let witness = node
        .get_public_data_witness(block, index)
        .await
        .map_err(OracleError::Node)?;
    Ok(OracleWitness {
        tree_index: index,
        witness,
    })
}
