//! The persisted tagging-secret input blob (§6 "Persisted state").

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::base::TaggingSecretEntry;

/// `{account, secrets: [...]}`, the structured blob a caller passes in at
/// run time so the tag scanner (C1) has something to discover with.
///
/// The core itself persists nothing; this type exists only to give the
/// input blob named in §6 a concrete, schema-checked shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaggingSecretExport {
    /// Opaque account identifier this export belongs to.
    pub account: String,
    /// Every tagging-secret entry the account has registered.
    pub secrets: Vec<TaggingSecretEntry>,
}
