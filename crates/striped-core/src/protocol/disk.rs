//! Disk content-port request/response schema.

use serde::{Deserialize, Serialize};

/// All commands a Disk's content-port UDP endpoint accepts. Registration
/// with the Manager is a [`super::manager::ManagerRequest::RegisterDisk`]
/// sent *from* the disk, not received here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "kebab-case")]
pub enum DiskRequest {
    WriteBlock(WriteBlockArgs),
    ReadBlock(ReadBlockArgs),
    Fail(FailArgs),
    Wipe(WipeArgs),
    SetMode(SetModeArgs),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriteBlockArgs {
    pub file_name: String,
    pub stripe_idx: u64,
    pub disk_index: usize,
    pub block_b64: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadBlockArgs {
    pub file_name: String,
    pub stripe_idx: u64,
    pub disk_index: usize,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct FailArgs {}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct WipeArgs {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskMode {
    Normal,
    Fail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetModeArgs {
    pub state: DiskMode,
}

// --- success payloads ---------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadBlockOk {
    pub block_b64: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailOk {
    pub event: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetModeOk {
    pub mode: DiskMode,
}
