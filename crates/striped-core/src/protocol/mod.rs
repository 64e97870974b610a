//! Wire protocol: one tagged enum per role's inbound commands, explicit
//! per-command argument/result structs, no untyped JSON bags.

pub mod common;
pub mod disk;
pub mod manager;

pub use common::*;
