//! In-memory block store keyed by (file, stripe, disk slot).
//!
//! Purely volatile: destroyed on `wipe`, `fail`, or process exit, per the
//! disk role's non-goal of on-disk persistence.

use std::collections::HashMap;

use striped_core::protocol::disk::DiskMode;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
struct BlockKey {
    file_name: String,
    stripe_idx: u64,
    disk_index: usize,
}

pub struct Store {
    blocks: HashMap<BlockKey, Vec<u8>>,
    mode: DiskMode,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            mode: DiskMode::Normal,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> DiskMode {
        self.mode
    }

    pub fn write_block(&mut self, file_name: String, stripe_idx: u64, disk_index: usize, data: Vec<u8>) {
        self.blocks.insert(
            BlockKey {
                file_name,
                stripe_idx,
                disk_index,
            },
            data,
        );
    }

    #[must_use]
    pub fn read_block(&self, file_name: &str, stripe_idx: u64, disk_index: usize) -> Option<&[u8]> {
        self.blocks
            .get(&BlockKey {
                file_name: file_name.to_string(),
                stripe_idx,
                disk_index,
            })
            .map(Vec::as_slice)
    }

    /// Clears the store and sets mode to `fail`.
    pub fn fail(&mut self) {
        self.blocks.clear();
        self.mode = DiskMode::Fail;
    }

    /// Clears the store, leaving mode unchanged.
    pub fn wipe(&mut self) {
        self.blocks.clear();
    }

    pub fn set_mode(&mut self, mode: DiskMode) {
        self.mode = mode;
    }
}
