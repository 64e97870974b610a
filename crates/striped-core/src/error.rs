//! Typed error hierarchies for each role, mapped to wire-level
//! `{"status":"FAILURE","error": <display string>}` at the dispatch edge —
//! these never cross the wire as structured JSON themselves.

use thiserror::Error;

/// Errors a Manager command handler can return.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("duplicate or bad user_name")]
    DuplicateOrBadUser,
    #[error("duplicate or bad disk_name")]
    DuplicateOrBadDisk,
    #[error("no such user")]
    NoSuchUser,
    #[error("no such disk")]
    NoSuchDisk,
    #[error("disk is InDSS; cannot deregister")]
    DiskInUse,
    #[error("dss_name already in use")]
    DuplicateDss,
    #[error("n must be >= 3")]
    NTooSmall,
    #[error("striping_unit out of range")]
    StripingUnitOutOfRange,
    #[error("striping_unit too large for one datagram")]
    StripingUnitTooLarge,
    #[error("fewer than n disks Free")]
    NotEnoughFreeDisks,
    #[error("no such dss")]
    NoSuchDss,
    #[error("file not found")]
    FileNotFound,
    #[error("NOT_OWNER")]
    NotOwner,
    #[error("busy: {op} in progress")]
    Busy { op: &'static str },
    #[error("no matching operation in progress")]
    NoMatchingOperation,
    #[error("bad json: {0}")]
    BadJson(String),
}

/// Errors a Disk content-port handler can return.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("missing/invalid fields")]
    InvalidFields,
    #[error("decode error: {0}")]
    DecodeError(String),
    #[error("not found")]
    NotFound,
    #[error("simulated failure")]
    SimulatedFailure,
    #[error("state must be 'normal' or 'fail'")]
    InvalidMode,
    #[error("unsupported")]
    Unsupported,
    #[error("bad json: {0}")]
    BadJson(String),
}

/// Errors surfaced by the User's stripe engine and RPC client.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("timeout")]
    Timeout,
    #[error("manager rejected command: {0}")]
    Rejected(String),
    #[error("stripe {stripe} unreadable after {retries} retries")]
    StripeUnrecoverable { stripe: u64, retries: u32 },
    #[error("checksum mismatch for {file}")]
    ChecksumMismatch { file: String },
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
