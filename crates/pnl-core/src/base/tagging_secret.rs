//! Tagging secrets: the per-counterparty material a recipient uses to
//! discover and decrypt their own swap events.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Which side of a logical relationship this entry's tag was emitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Events sent to this account.
    Inbound,
    /// Events sent by this account.
    Outbound,
}

/// One entry of a recipient's tagging-secret export (§6 "Persisted state").
///
/// Only `secret` and `app` are consumed by the tag scanner (C1); the
/// remaining fields are metadata preserved across the retrieval API but
/// never forwarded further into the pipeline (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TaggingSecretEntry {
    /// The scalar used to derive per-index tags, `H([secret, i])`.
    pub secret: Field,
    /// The contract address this secret is siloed to.
    pub app: Field,
    /// The counterparty address associated with this tagging relationship.
    pub counterparty: Field,
    /// Whether this entry discovers inbound or outbound events.
    pub direction: Direction,
    /// An optional human-readable label, preserved but otherwise unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Direction, TaggingSecretEntry};
    use crate::field::Field;

    #[test]
    fn serde_round_trip_preserves_metadata() {
        let entry = TaggingSecretEntry {
            secret: Field::from_u64(1),
            app: Field::from_u64(2),
            counterparty: Field::from_u64(3),
            direction: Direction::Outbound,
            label: Some("primary".to_owned()),
        };
        let json = serde_json::to_string(&entry).expect("serialize");
        let back: TaggingSecretEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, entry);
    }

    #[test]
    fn label_defaults_to_none_when_absent() {
        let json = r#"{"secret":"0x01","app":"0x02","counterparty":"0x03","direction":"inbound"}"#;
        let entry: TaggingSecretEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.label, None);
        assert_eq!(entry.direction, Direction::Inbound);
    }
}
