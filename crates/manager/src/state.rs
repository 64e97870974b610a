//! Manager-owned registries: users, disks, DSSes, and the busy flag.
//!
//! Modeled as a single owned struct passed to the dispatch routine rather
//! than module-level globals.

use std::collections::HashMap;

use striped_core::protocol::{DiskSnapshot, DiskState, DssSnapshot, FileMeta, UserSnapshot};

#[derive(Clone, Debug)]
pub struct DiskRecord {
    pub name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
    pub state: DiskState,
}

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub name: String,
    pub ip: String,
    pub m_port: u16,
    pub c_port: u16,
}

#[derive(Clone, Debug)]
pub struct DssRecord {
    pub dss_name: String,
    pub n: usize,
    pub striping_unit: u64,
    pub disks: Vec<String>,
    pub files: HashMap<String, FileMeta>,
}

/// The single long-running operation a Manager will arbitrate at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Copy,
    Decommission,
    Recovery,
    Read,
}

impl Op {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Op::Copy => "copy",
            Op::Decommission => "decommission",
            Op::Recovery => "recovery",
            Op::Read => "read",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Busy {
    pub op: Option<Op>,
    pub dss: Option<String>,
    pub user: Option<String>,
}

impl Busy {
    fn begin(&mut self, op: Op, dss: &str, user: &str) {
        self.op = Some(op);
        self.dss = Some(dss.to_string());
        self.user = Some(user.to_string());
    }

    fn clear(&mut self) {
        self.op = None;
        self.dss = None;
        self.user = None;
    }

    /// True if `op` on `dss_name` is the exact completion this busy slot is
    /// waiting on.
    fn matches(&self, op: Op, dss_name: &str) -> bool {
        self.op == Some(op) && self.dss.as_deref() == Some(dss_name)
    }
}

#[derive(Default)]
pub struct ManagerState {
    pub users: HashMap<String, UserRecord>,
    pub disks: HashMap<String, DiskRecord>,
    pub dsses: HashMap<String, DssRecord>,
    pub busy: Busy,
}

impl ManagerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn free_disk_names_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .disks
            .values()
            .filter(|d| d.state.is_free())
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn begin_op(&mut self, op: Op, dss_name: &str, user_name: &str) {
        self.busy.begin(op, dss_name, user_name);
    }

    /// Clears the busy slot iff it currently matches `op` on `dss_name`;
    /// returns whether it matched (and was cleared).
    pub fn complete_op(&mut self, op: Op, dss_name: &str) -> bool {
        if self.busy.matches(op, dss_name) {
            self.busy.clear();
            true
        } else {
            false
        }
    }

    /// Whether `op` on `dss_name` is exactly the completion the busy slot
    /// is waiting on (checked before a completion handler mutates state).
    #[must_use]
    pub fn is_matching_completion(&self, op: Op, dss_name: &str) -> bool {
        self.busy.matches(op, dss_name)
    }

    /// Whether `op` on `dss_name` would be rejected as blocked by another
    /// in-flight operation (i.e. it is neither idle nor the exact completion
    /// the busy slot awaits).
    #[must_use]
    pub fn blocked_by_busy(&self, requested_completion: Option<(Op, &str)>) -> bool {
        match (&self.busy.op, requested_completion) {
            (None, _) => false,
            (Some(_), Some((op, dss))) => !self.busy.matches(op, dss),
            (Some(_), None) => true,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> (Vec<UserSnapshot>, Vec<DiskSnapshot>, Vec<DssSnapshot>, Vec<String>) {
        let users = self
            .users
            .values()
            .map(|u| UserSnapshot {
                user_name: u.name.clone(),
                ip: u.ip.clone(),
                m_port: u.m_port,
                c_port: u.c_port,
            })
            .collect();
        let disks = self
            .disks
            .values()
            .map(|d| DiskSnapshot {
                disk_name: d.name.clone(),
                ip: d.ip.clone(),
                m_port: d.m_port,
                c_port: d.c_port,
                state: d.state.clone(),
            })
            .collect();
        let dsses = self
            .dsses
            .values()
            .map(|dss| DssSnapshot {
                dss_name: dss.dss_name.clone(),
                n: dss.n,
                striping_unit: dss.striping_unit,
                disks: dss.disks.clone(),
                files: dss.files.clone(),
            })
            .collect();
        let free_disks = self.free_disk_names_sorted();
        (users, disks, dsses, free_disks)
    }
}
