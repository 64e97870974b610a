//! Types shared across the manager and disk protocol modules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A disk's membership state as tracked by the Manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DiskState {
    Free,
    InDss { dss_name: String },
}

impl DiskState {
    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self, DiskState::Free)
    }
}

/// Everything the User needs to contact one disk's content port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskEndpoint {
    pub disk_name: String,
    pub ip: String,
    pub c_port: u16,
}

/// Metadata the Manager records for a file once `copy-complete` lands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub owner: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// A DSS as shown by `ls`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DssSnapshot {
    pub dss_name: String,
    pub n: usize,
    pub striping_unit: u64,
    pub disks: Vec<String>,
    pub files: HashMap<String, FileMeta>,
}

/// A disk as shown by `ls`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSnapshot {
    pub disk_name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
    pub state: DiskState,
}

/// A user as shown by `ls`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
}
