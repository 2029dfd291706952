//! Serde/schemars-facing record types: run configuration, persisted input
//! blobs, and the system's public outputs.

mod config;
mod public_outputs;
mod summary;
mod tagging_secret_export;

pub use config::PipelineConfig;
pub use public_outputs::{SWAP_PUBLIC_OUTPUTS_LEN, SwapPublicOutputs, WrongOutputCount};
pub use summary::RunSummary;
pub use tagging_secret_export::TaggingSecretExport;
