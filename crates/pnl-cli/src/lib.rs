//! Library half of the `pnl` CLI: argument definitions, the HTTP-backed
//! [`pnl_core::NodeClient`]/[`pnl_prover::ProverClient`] implementations,
//! and the command bodies `main.rs` dispatches to.
//!
//! Split into a `lib` + `bin` pair so `tests/` can exercise command bodies
//! directly as well as through `assert_cmd`.

pub mod cli;
pub mod commands;
pub mod node_client;
pub mod prover_client;

pub use cli::{Cli, Commands, RunArgs, ScanArgs};
pub use node_client::HttpNodeClient;
pub use prover_client::HttpProverClient;
