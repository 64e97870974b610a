//! Stripe engine and RPC plumbing for the interactive client, split out of
//! the binary so integration tests can drive it without a terminal.

pub mod cli;
pub mod engine;
pub mod repl;
pub mod rpc;
