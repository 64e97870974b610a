//! Manager-port request/response schema.
//!
//! Every request has shape `{"cmd": <string>, "args": {...}}`; the matching
//! success payload is deserialized via [`crate::wire::Reply`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{DiskEndpoint, FileMeta};

/// All commands the Manager's UDP endpoint accepts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "kebab-case")]
pub enum ManagerRequest {
    RegisterUser(RegisterUserArgs),
    RegisterDisk(RegisterDiskArgs),
    DeregisterUser(DeregisterUserArgs),
    DeregisterDisk(DeregisterDiskArgs),
    ConfigureDss(ConfigureDssArgs),
    Ls(LsArgs),
    CopyPrepare(CopyPrepareArgs),
    CopyComplete(CopyCompleteArgs),
    ReadPrepare(ReadPrepareArgs),
    ReadComplete(ReadCompleteArgs),
    DecommissionDss(DecommissionDssArgs),
    DecommissionComplete(DecommissionCompleteArgs),
    DiskFailure(DiskFailureArgs),
    RecoveryComplete(RecoveryCompleteArgs),
}

/// `ls` carries no arguments; kept as a struct (rather than a unit variant)
/// so every request round-trips through the same `{"args": {...}}` shape.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct LsArgs {}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterUserArgs {
    pub user_name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterDiskArgs {
    pub disk_name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeregisterUserArgs {
    pub user_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeregisterDiskArgs {
    pub disk_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigureDssArgs {
    pub dss_name: String,
    pub n: usize,
    pub striping_unit: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CopyPrepareArgs {
    pub dss_name: String,
    pub file_name: String,
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CopyCompleteArgs {
    pub dss_name: String,
    pub file_name: String,
    pub owner: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadPrepareArgs {
    pub dss_name: String,
    pub file_name: String,
    pub user_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadCompleteArgs {
    pub dss_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecommissionDssArgs {
    pub dss_name: String,
    pub user_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecommissionCompleteArgs {
    pub dss_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiskFailureArgs {
    pub dss_name: String,
    pub user_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryCompleteArgs {
    pub dss_name: String,
}

// --- success payloads ---------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigureDssOk {
    pub disks: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LsOk {
    pub users: Vec<super::common::UserSnapshot>,
    pub disks: Vec<super::common::DiskSnapshot>,
    pub dsses: Vec<super::common::DssSnapshot>,
    pub free_disks: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrepareOk {
    pub n: usize,
    pub b: u64,
    pub disks: Vec<DiskEndpoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadPrepareOk {
    pub n: usize,
    pub b: u64,
    pub disks: Vec<DiskEndpoint>,
    pub size: u64,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointBundleOk {
    pub disks: Vec<DiskEndpoint>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiskFailureOk {
    pub striping_unit: u64,
    pub disks: Vec<DiskEndpoint>,
    pub files: HashMap<String, FileMeta>,
}
