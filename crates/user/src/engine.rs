//! Stripe write/read engine: the User's core logic for `copy`, `read`, and
//! the failure-injection/recovery drill, built on `striped-core::layout`.

use std::net::SocketAddr;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use tokio::task::JoinSet;
use tracing::{info, warn};

use striped_core::checksum::sha256_hex;
use striped_core::error::UserError;
use striped_core::layout::{blocks_per_stripe, data_slots, parity_slot, split_into_stripes, total_stripes, xor_blocks};
use striped_core::limits::{BLOCK_RPC_TIMEOUT, MAX_STRIPE_RETRIES};
use striped_core::protocol::common::{DiskEndpoint, FileMeta};
use striped_core::protocol::disk::{
    DiskMode, DiskRequest, FailArgs, ReadBlockArgs, ReadBlockOk, SetModeArgs, WriteBlockArgs,
};
use striped_core::protocol::manager::*;
use striped_core::wire::Ack;

use crate::rpc::{block_call, call};

/// Holds this User's identity, the manager's endpoint, and the one socket
/// every manager-port RPC is sent through (separate from block RPCs, which
/// each get their own ephemeral socket).
pub struct Client {
    pub user_name: String,
    manager_addr: SocketAddr,
    socket: tokio::net::UdpSocket,
}

impl Client {
    /// # Errors
    /// Returns an error if the local management socket cannot be bound.
    pub async fn bind(
        user_name: String,
        manager_addr: SocketAddr,
        my_m_port: u16,
    ) -> Result<Self, UserError> {
        let socket = tokio::net::UdpSocket::bind(("0.0.0.0", my_m_port)).await?;
        Ok(Self {
            user_name,
            manager_addr,
            socket,
        })
    }

    async fn manager_call<Req, Resp>(&self, req: &Req) -> Result<Resp, UserError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        call(&self.socket, self.manager_addr, req, BLOCK_RPC_TIMEOUT).await
    }

    pub async fn register(&self, ip: String, m_port: u16, c_port: u16) -> Result<(), UserError> {
        let req = ManagerRequest::RegisterUser(RegisterUserArgs {
            user_name: self.user_name.clone(),
            ip,
            m_port,
            c_port,
        });
        self.manager_call::<_, Ack>(&req).await?;
        Ok(())
    }

    pub async fn deregister(&self) -> Result<(), UserError> {
        let req = ManagerRequest::DeregisterUser(DeregisterUserArgs {
            user_name: self.user_name.clone(),
        });
        self.manager_call::<_, Ack>(&req).await?;
        Ok(())
    }

    pub async fn ls(&self) -> Result<LsOk, UserError> {
        self.manager_call(&ManagerRequest::Ls(LsArgs {})).await
    }

    pub async fn configure_dss(&self, dss_name: &str, n: usize, b: u64) -> Result<ConfigureDssOk, UserError> {
        let req = ManagerRequest::ConfigureDss(ConfigureDssArgs {
            dss_name: dss_name.to_string(),
            n,
            striping_unit: b,
        });
        self.manager_call(&req).await
    }

    pub async fn decommission(&self, dss_name: &str) -> Result<(), UserError> {
        let req = ManagerRequest::DecommissionDss(DecommissionDssArgs {
            dss_name: dss_name.to_string(),
            user_name: self.user_name.clone(),
        });
        let bundle: EndpointBundleOk = self.manager_call(&req).await?;
        for disk in &bundle.disks {
            let wipe = DiskRequest::Wipe(striped_core::protocol::disk::WipeArgs {});
            let addr = disk_addr(disk);
            if let Err(e) = block_call::<_, Ack>(addr, wipe).await {
                warn!(disk = %disk.disk_name, error = %e, "wipe failed during decommission");
            }
        }
        let complete = ManagerRequest::DecommissionComplete(DecommissionCompleteArgs {
            dss_name: dss_name.to_string(),
        });
        self.manager_call::<_, Ack>(&complete).await?;
        Ok(())
    }

    /// Stripes `src_path`'s bytes across the DSS's disks, placing parity per
    /// the left-symmetric rotation, then records the file with the manager.
    pub async fn copy(&self, dss_name: &str, src_path: &Path) -> Result<(), UserError> {
        let data = std::fs::read(src_path)?;
        let file_name = file_name_of(src_path)?;

        let prepare = ManagerRequest::CopyPrepare(CopyPrepareArgs {
            dss_name: dss_name.to_string(),
            file_name: file_name.clone(),
            owner: self.user_name.clone(),
        });
        let prep: PrepareOk = self.manager_call(&prepare).await?;

        let stripes = split_into_stripes(&data, prep.n, prep.b);
        for (s, chunks) in stripes.iter().enumerate() {
            write_stripe(&prep.disks, prep.n, s as u64, &file_name, chunks).await?;
        }

        let checksum = sha256_hex(&data);
        let complete = ManagerRequest::CopyComplete(CopyCompleteArgs {
            dss_name: dss_name.to_string(),
            file_name,
            owner: self.user_name.clone(),
            size: data.len() as u64,
            checksum: Some(checksum),
        });
        self.manager_call::<_, Ack>(&complete).await?;
        info!(dss = dss_name, bytes = data.len(), "copy complete");
        Ok(())
    }

    /// Reads `file_name` from the DSS, reconstructing any single missing or
    /// corrupted block per stripe, and writes the result to `dest_path`.
    pub async fn read(
        &self,
        dss_name: &str,
        file_name: &str,
        dest_path: &Path,
        fault_injection_pct: Option<u8>,
    ) -> Result<(), UserError> {
        let req = ManagerRequest::ReadPrepare(ReadPrepareArgs {
            dss_name: dss_name.to_string(),
            file_name: file_name.to_string(),
            user_name: self.user_name.clone(),
        });
        let prep: ReadPrepareOk = self.manager_call(&req).await?;

        let stripes = total_stripes(prep.size, prep.n, prep.b);
        let mut out = Vec::with_capacity(prep.size as usize);

        for s in 0..stripes {
            let data_chunks = read_stripe_with_retries(
                &prep.disks,
                prep.n,
                s,
                file_name,
                fault_injection_pct,
            )
            .await?;
            for chunk in data_chunks {
                out.extend_from_slice(&chunk);
            }
        }
        out.truncate(prep.size as usize);

        if let Some(expected) = &prep.checksum {
            let actual = sha256_hex(&out);
            if actual != *expected {
                return Err(UserError::ChecksumMismatch {
                    file: file_name.to_string(),
                });
            }
        }

        std::fs::write(dest_path, &out)?;

        let complete = ManagerRequest::ReadComplete(ReadCompleteArgs {
            dss_name: dss_name.to_string(),
        });
        self.manager_call::<_, Ack>(&complete).await?;
        info!(dss = dss_name, file = file_name, bytes = out.len(), "read complete");
        Ok(())
    }

    /// Injects a simulated failure on one randomly chosen disk, rebuilds
    /// every file's every stripe onto it from the survivors, then clears
    /// the failure and tells the manager recovery is complete.
    pub async fn disk_failure_drill(&self, dss_name: &str) -> Result<(), UserError> {
        let req = ManagerRequest::DiskFailure(DiskFailureArgs {
            dss_name: dss_name.to_string(),
            user_name: self.user_name.clone(),
        });
        let reply: DiskFailureOk = self.manager_call(&req).await?;

        let n = reply.disks.len();
        let failed_slot = rand::rng().random_range(0..n);
        let failed_disk = &reply.disks[failed_slot];
        info!(dss = dss_name, slot = failed_slot, disk = %failed_disk.disk_name, "injecting failure");
        block_call::<_, Ack>(disk_addr(failed_disk), DiskRequest::Fail(FailArgs {})).await?;

        for (file_name, meta) in &reply.files {
            rebuild_file_onto(
                &reply.disks,
                n,
                reply.striping_unit,
                failed_slot,
                file_name,
                meta,
            )
            .await?;
        }

        let set_normal = DiskRequest::SetMode(SetModeArgs {
            state: DiskMode::Normal,
        });
        block_call::<_, striped_core::protocol::disk::SetModeOk>(disk_addr(failed_disk), set_normal)
            .await?;

        let complete = ManagerRequest::RecoveryComplete(RecoveryCompleteArgs {
            dss_name: dss_name.to_string(),
        });
        self.manager_call::<_, Ack>(&complete).await?;
        info!(dss = dss_name, "recovery complete");
        Ok(())
    }
}

fn disk_addr(d: &DiskEndpoint) -> SocketAddr {
    format!("{}:{}", d.ip, d.c_port)
        .parse()
        .expect("disk endpoint ip:port must be a valid socket address")
}

fn file_name_of(path: &Path) -> Result<String, UserError> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| UserError::Rejected("source path has no file name".to_string()))
}

/// Writes one stripe's `n` blocks (data chunks plus parity) to their slots
/// in parallel, one ephemeral socket per worker task. Aborts on the first
/// failed slot rather than sending `copy-complete` for a partial stripe.
async fn write_stripe(
    disks: &[DiskEndpoint],
    n: usize,
    stripe_idx: u64,
    file_name: &str,
    data_chunks: &[Vec<u8>],
) -> Result<(), UserError> {
    let parity = xor_blocks(data_chunks);
    let parity_idx = parity_slot(n, stripe_idx);
    let slots = data_slots(n, stripe_idx);

    let mut blocks: Vec<Option<Vec<u8>>> = vec![None; n];
    for (chunk, &slot) in data_chunks.iter().zip(slots.iter()) {
        blocks[slot] = Some(chunk.clone());
    }
    blocks[parity_idx] = Some(parity);

    let mut tasks = JoinSet::new();
    for (slot, block) in blocks.into_iter().enumerate() {
        let block = block.expect("every slot assigned exactly once");
        let addr = disk_addr(&disks[slot]);
        let req = DiskRequest::WriteBlock(WriteBlockArgs {
            file_name: file_name.to_string(),
            stripe_idx,
            disk_index: slot,
            block_b64: BASE64.encode(&block),
        });
        tasks.spawn(async move { block_call::<_, Ack>(addr, req).await });
    }

    while let Some(res) = tasks.join_next().await {
        res.map_err(|e| UserError::Rejected(format!("worker task panicked: {e}")))??;
    }
    Ok(())
}

/// Reads one stripe's `n` blocks in parallel, reconstructing a single
/// missing/corrupted block via XOR, retrying up to `MAX_STRIPE_RETRIES`
/// times on corruption or multiple missing blocks.
async fn read_stripe_with_retries(
    disks: &[DiskEndpoint],
    n: usize,
    stripe_idx: u64,
    file_name: &str,
    fault_injection_pct: Option<u8>,
) -> Result<Vec<Vec<u8>>, UserError> {
    for attempt in 0..=MAX_STRIPE_RETRIES {
        match read_stripe_once(disks, n, stripe_idx, file_name, fault_injection_pct).await {
            Some(data) => return Ok(data),
            None => {
                warn!(stripe = stripe_idx, attempt, "stripe read failed, retrying");
            }
        }
    }
    Err(UserError::StripeUnrecoverable {
        stripe: stripe_idx,
        retries: MAX_STRIPE_RETRIES,
    })
}

async fn read_stripe_once(
    disks: &[DiskEndpoint],
    n: usize,
    stripe_idx: u64,
    file_name: &str,
    fault_injection_pct: Option<u8>,
) -> Option<Vec<Vec<u8>>> {
    let mut tasks = JoinSet::new();
    for slot in 0..n {
        let addr = disk_addr(&disks[slot]);
        let req = DiskRequest::ReadBlock(ReadBlockArgs {
            file_name: file_name.to_string(),
            stripe_idx,
            disk_index: slot,
        });
        tasks.spawn(async move { (slot, block_call::<_, ReadBlockOk>(addr, req).await) });
    }

    let mut blocks: Vec<Option<Vec<u8>>> = vec![None; n];
    while let Some(res) = tasks.join_next().await {
        let (slot, result) = res.ok()?;
        if let Ok(ok) = result {
            if let Ok(mut data) = BASE64.decode(ok.block_b64.as_bytes()) {
                maybe_flip_bit(&mut data, fault_injection_pct);
                blocks[slot] = Some(data);
            }
        }
    }

    let missing: Vec<usize> = (0..n).filter(|&i| blocks[i].is_none()).collect();
    let parity_idx = parity_slot(n, stripe_idx);

    match missing.len() {
        0 => {
            let present: Vec<Vec<u8>> = blocks.into_iter().map(Option::unwrap).collect();
            if !xor_is_zero(&present) {
                return None;
            }
            Some(extract_data_blocks(present, parity_idx))
        }
        1 => {
            let present: Vec<Vec<u8>> = blocks
                .iter()
                .filter_map(Option::as_ref)
                .cloned()
                .collect();
            let reconstructed = xor_blocks(&present);
            blocks[missing[0]] = Some(reconstructed);
            let full: Vec<Vec<u8>> = blocks.into_iter().map(Option::unwrap).collect();
            if !xor_is_zero(&full) {
                return None;
            }
            Some(extract_data_blocks(full, parity_idx))
        }
        _ => None,
    }
}

fn xor_is_zero(blocks: &[Vec<u8>]) -> bool {
    xor_blocks(blocks).iter().all(|&b| b == 0)
}

fn extract_data_blocks(blocks: Vec<Vec<u8>>, parity_idx: usize) -> Vec<Vec<u8>> {
    blocks
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != parity_idx)
        .map(|(_, v)| v)
        .collect()
}

/// With probability `pct/100`, flips one random bit in `data` — the
/// read-side fault injection knob used to exercise the retry/reconstruction
/// path under synthetic corruption.
fn maybe_flip_bit(data: &mut [u8], pct: Option<u8>) {
    let Some(pct) = pct else { return };
    if data.is_empty() {
        return;
    }
    let mut rng = rand::rng();
    if rng.random_range(0..100) < pct {
        let byte_idx = rng.random_range(0..data.len());
        let bit = rng.random_range(0..8u32);
        data[byte_idx] ^= 1 << bit;
    }
}

/// Rebuilds every stripe of one file onto `failed_slot` from the `n-1`
/// survivors, writing the reconstructed block back via `write-block` (which
/// `fail` mode still accepts).
async fn rebuild_file_onto(
    disks: &[DiskEndpoint],
    n: usize,
    b: u64,
    failed_slot: usize,
    file_name: &str,
    meta: &FileMeta,
) -> Result<(), UserError> {
    let stripes = total_stripes(meta.size, n, b);
    for s in 0..stripes {
        let mut tasks = JoinSet::new();
        for slot in 0..n {
            if slot == failed_slot {
                continue;
            }
            let addr = disk_addr(&disks[slot]);
            let req = DiskRequest::ReadBlock(ReadBlockArgs {
                file_name: file_name.to_string(),
                stripe_idx: s,
                disk_index: slot,
            });
            tasks.spawn(async move { block_call::<_, ReadBlockOk>(addr, req).await });
        }

        let mut survivors = Vec::with_capacity(blocks_per_stripe(n));
        while let Some(res) = tasks.join_next().await {
            let ok = res.map_err(|e| UserError::Rejected(format!("worker task panicked: {e}")))??;
            let data = BASE64
                .decode(ok.block_b64.as_bytes())
                .map_err(|e| UserError::Rejected(format!("bad base64 from survivor: {e}")))?;
            survivors.push(data);
        }

        let rebuilt = xor_blocks(&survivors);
        let addr = disk_addr(&disks[failed_slot]);
        let write = DiskRequest::WriteBlock(WriteBlockArgs {
            file_name: file_name.to_string(),
            stripe_idx: s,
            disk_index: failed_slot,
            block_b64: BASE64.encode(&rebuilt),
        });
        block_call::<_, Ack>(addr, write).await?;
    }
    Ok(())
}
