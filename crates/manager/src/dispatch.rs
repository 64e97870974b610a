//! Recv-decode-dispatch-reply handling for every Manager command.

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{info, warn};

use striped_core::error::ManagerError;
use striped_core::limits::{
    MAX_STRIPING_UNIT, MIN_DSS_DISKS, MIN_STRIPING_UNIT, striping_unit_fits_one_datagram,
};
use striped_core::protocol::common::{DiskEndpoint, DiskState, FileMeta};
use striped_core::protocol::manager::*;
use striped_core::wire::{Ack, Reply, decode, encode};

use crate::state::{DiskRecord, DssRecord, ManagerState, Op, UserRecord};

/// Encodes a handler's `Result` as wire bytes, mapping `Err` to
/// `{"status":"FAILURE","error": <display string>}` once at the dispatch edge.
fn reply_of<T: Serialize>(result: Result<T, ManagerError>) -> Vec<u8> {
    match result {
        Ok(t) => encode(&Reply::ok(t)).unwrap(),
        Err(e) => encode(&Reply::<T>::err(e.to_string())).unwrap(),
    }
}

fn is_power_of_two(b: u64) -> bool {
    b != 0 && (b & (b - 1)) == 0
}

fn endpoint_bundle(state: &ManagerState, dss: &DssRecord) -> Vec<DiskEndpoint> {
    dss.disks
        .iter()
        .map(|name| {
            let d = &state.disks[name];
            DiskEndpoint {
                disk_name: d.name.clone(),
                ip: d.ip.clone(),
                c_port: d.c_port,
            }
        })
        .collect()
}

/// Which `(Op, dss_name)` this request would complete, if it is a
/// completion command at all.
fn completion_identity(req: &ManagerRequest) -> Option<(Op, &str)> {
    match req {
        ManagerRequest::CopyComplete(a) => Some((Op::Copy, a.dss_name.as_str())),
        ManagerRequest::ReadComplete(a) => Some((Op::Read, a.dss_name.as_str())),
        ManagerRequest::DecommissionComplete(a) => Some((Op::Decommission, a.dss_name.as_str())),
        ManagerRequest::RecoveryComplete(a) => Some((Op::Recovery, a.dss_name.as_str())),
        _ => None,
    }
}

/// Decodes, dispatches, and re-encodes one Manager request. Returns the
/// wire bytes to send back to the peer.
#[must_use]
pub fn handle_bytes(state: &mut ManagerState, peer: std::net::SocketAddr, bytes: &[u8]) -> Vec<u8> {
    let req: ManagerRequest = match decode(bytes) {
        Ok(req) => req,
        Err(e) => {
            warn!(%peer, error = %e, "bad json");
            return reply_of(Err::<Ack, _>(ManagerError::BadJson(e.to_string())));
        }
    };

    if state.blocked_by_busy(completion_identity(&req)) {
        let op = state.busy.op.expect("blocked implies an op is set").label();
        warn!(%peer, blocking_op = op, "busy: rejecting command");
        return reply_of(Err::<Ack, _>(ManagerError::Busy { op }));
    }

    info!(%peer, cmd = request_label(&req), "accepted");
    handle(state, req)
}

fn request_label(req: &ManagerRequest) -> &'static str {
    match req {
        ManagerRequest::RegisterUser(_) => "register-user",
        ManagerRequest::RegisterDisk(_) => "register-disk",
        ManagerRequest::DeregisterUser(_) => "deregister-user",
        ManagerRequest::DeregisterDisk(_) => "deregister-disk",
        ManagerRequest::ConfigureDss(_) => "configure-dss",
        ManagerRequest::Ls(_) => "ls",
        ManagerRequest::CopyPrepare(_) => "copy-prepare",
        ManagerRequest::CopyComplete(_) => "copy-complete",
        ManagerRequest::ReadPrepare(_) => "read-prepare",
        ManagerRequest::ReadComplete(_) => "read-complete",
        ManagerRequest::DecommissionDss(_) => "decommission-dss",
        ManagerRequest::DecommissionComplete(_) => "decommission-complete",
        ManagerRequest::DiskFailure(_) => "disk-failure",
        ManagerRequest::RecoveryComplete(_) => "recovery-complete",
    }
}

/// Dispatches an already-admitted (not busy-blocked) request.
#[must_use]
pub fn handle(state: &mut ManagerState, req: ManagerRequest) -> Vec<u8> {
    match req {
        ManagerRequest::RegisterUser(a) => reply_of(register_user(state, a)),
        ManagerRequest::RegisterDisk(a) => reply_of(register_disk(state, a)),
        ManagerRequest::DeregisterUser(a) => reply_of(deregister_user(state, a)),
        ManagerRequest::DeregisterDisk(a) => reply_of(deregister_disk(state, a)),
        ManagerRequest::ConfigureDss(a) => reply_of(handle_configure_dss(state, a)),
        ManagerRequest::Ls(_) => {
            let (users, disks, dsses, free_disks) = state.snapshot();
            reply_of(Ok::<_, ManagerError>(LsOk {
                users,
                disks,
                dsses,
                free_disks,
            }))
        }
        ManagerRequest::CopyPrepare(a) => reply_of(copy_prepare(state, a)),
        ManagerRequest::CopyComplete(a) => reply_of(copy_complete(state, a)),
        ManagerRequest::ReadPrepare(a) => reply_of(read_prepare(state, a)),
        ManagerRequest::ReadComplete(a) => reply_of(read_complete(state, a)),
        ManagerRequest::DecommissionDss(a) => reply_of(decommission_dss(state, a)),
        ManagerRequest::DecommissionComplete(a) => reply_of(decommission_complete(state, a)),
        ManagerRequest::DiskFailure(a) => reply_of(disk_failure(state, a)),
        ManagerRequest::RecoveryComplete(a) => reply_of(recovery_complete(state, a)),
    }
}

fn register_user(state: &mut ManagerState, a: RegisterUserArgs) -> Result<Ack, ManagerError> {
    if a.user_name.is_empty() || state.users.contains_key(&a.user_name) {
        return Err(ManagerError::DuplicateOrBadUser);
    }
    state.users.insert(
        a.user_name.clone(),
        UserRecord {
            name: a.user_name,
            ip: a.ip,
            m_port: a.m_port,
            c_port: a.c_port,
        },
    );
    Ok(Ack {})
}

fn register_disk(state: &mut ManagerState, a: RegisterDiskArgs) -> Result<Ack, ManagerError> {
    if a.disk_name.is_empty() || state.disks.contains_key(&a.disk_name) {
        return Err(ManagerError::DuplicateOrBadDisk);
    }
    state.disks.insert(
        a.disk_name.clone(),
        DiskRecord {
            name: a.disk_name,
            ip: a.ip,
            m_port: a.m_port,
            c_port: a.c_port,
            state: DiskState::Free,
        },
    );
    Ok(Ack {})
}

fn deregister_user(state: &mut ManagerState, a: DeregisterUserArgs) -> Result<Ack, ManagerError> {
    state
        .users
        .remove(&a.user_name)
        .ok_or(ManagerError::NoSuchUser)?;
    Ok(Ack {})
}

fn deregister_disk(state: &mut ManagerState, a: DeregisterDiskArgs) -> Result<Ack, ManagerError> {
    let disk = state
        .disks
        .get(&a.disk_name)
        .ok_or(ManagerError::NoSuchDisk)?;
    if !disk.state.is_free() {
        return Err(ManagerError::DiskInUse);
    }
    state.disks.remove(&a.disk_name);
    Ok(Ack {})
}

fn copy_prepare(state: &mut ManagerState, a: CopyPrepareArgs) -> Result<PrepareOk, ManagerError> {
    let dss = state.dsses.get(&a.dss_name).ok_or(ManagerError::NoSuchDss)?;
    let reply = PrepareOk {
        n: dss.n,
        b: dss.striping_unit,
        disks: endpoint_bundle(state, dss),
    };
    state.begin_op(Op::Copy, &a.dss_name, &a.owner);
    Ok(reply)
}

fn copy_complete(state: &mut ManagerState, a: CopyCompleteArgs) -> Result<Ack, ManagerError> {
    if !state.is_matching_completion(Op::Copy, &a.dss_name) {
        return Err(ManagerError::NoMatchingOperation);
    }
    let dss = state
        .dsses
        .get_mut(&a.dss_name)
        .ok_or(ManagerError::NoSuchDss)?;
    dss.files.insert(
        a.file_name,
        FileMeta {
            owner: a.owner,
            size: a.size,
            checksum: a.checksum,
        },
    );
    state.complete_op(Op::Copy, &a.dss_name);
    Ok(Ack {})
}

fn read_prepare(
    state: &mut ManagerState,
    a: ReadPrepareArgs,
) -> Result<ReadPrepareOk, ManagerError> {
    let dss = state.dsses.get(&a.dss_name).ok_or(ManagerError::NoSuchDss)?;
    let file = dss
        .files
        .get(&a.file_name)
        .ok_or(ManagerError::FileNotFound)?;
    if file.owner != a.user_name {
        return Err(ManagerError::NotOwner);
    }
    let reply = ReadPrepareOk {
        n: dss.n,
        b: dss.striping_unit,
        disks: endpoint_bundle(state, dss),
        size: file.size,
        owner: file.owner.clone(),
        checksum: file.checksum.clone(),
    };
    state.begin_op(Op::Read, &a.dss_name, &a.user_name);
    Ok(reply)
}

fn read_complete(state: &mut ManagerState, a: ReadCompleteArgs) -> Result<Ack, ManagerError> {
    if !state.complete_op(Op::Read, &a.dss_name) {
        return Err(ManagerError::NoMatchingOperation);
    }
    Ok(Ack {})
}

fn decommission_dss(
    state: &mut ManagerState,
    a: DecommissionDssArgs,
) -> Result<EndpointBundleOk, ManagerError> {
    let dss = state.dsses.get(&a.dss_name).ok_or(ManagerError::NoSuchDss)?;
    let reply = EndpointBundleOk {
        disks: endpoint_bundle(state, dss),
    };
    state.begin_op(Op::Decommission, &a.dss_name, &a.user_name);
    Ok(reply)
}

fn decommission_complete(
    state: &mut ManagerState,
    a: DecommissionCompleteArgs,
) -> Result<Ack, ManagerError> {
    if !state.is_matching_completion(Op::Decommission, &a.dss_name) {
        return Err(ManagerError::NoMatchingOperation);
    }
    let dss = state
        .dsses
        .remove(&a.dss_name)
        .ok_or(ManagerError::NoSuchDss)?;
    for disk_name in &dss.disks {
        if let Some(disk) = state.disks.get_mut(disk_name) {
            disk.state = DiskState::Free;
        }
    }
    state.complete_op(Op::Decommission, &a.dss_name);
    Ok(Ack {})
}

fn disk_failure(
    state: &mut ManagerState,
    a: DiskFailureArgs,
) -> Result<DiskFailureOk, ManagerError> {
    let dss = state.dsses.get(&a.dss_name).ok_or(ManagerError::NoSuchDss)?;
    let reply = DiskFailureOk {
        striping_unit: dss.striping_unit,
        disks: endpoint_bundle(state, dss),
        files: dss.files.clone(),
    };
    state.begin_op(Op::Recovery, &a.dss_name, &a.user_name);
    Ok(reply)
}

fn recovery_complete(state: &mut ManagerState, a: RecoveryCompleteArgs) -> Result<Ack, ManagerError> {
    if !state.complete_op(Op::Recovery, &a.dss_name) {
        return Err(ManagerError::NoMatchingOperation);
    }
    Ok(Ack {})
}

fn handle_configure_dss(
    state: &mut ManagerState,
    a: ConfigureDssArgs,
) -> Result<ConfigureDssOk, ManagerError> {
    if state.dsses.contains_key(&a.dss_name) {
        return Err(ManagerError::DuplicateDss);
    }
    if a.n < MIN_DSS_DISKS {
        return Err(ManagerError::NTooSmall);
    }
    if !is_power_of_two(a.striping_unit)
        || a.striping_unit < MIN_STRIPING_UNIT
        || a.striping_unit > MAX_STRIPING_UNIT
    {
        return Err(ManagerError::StripingUnitOutOfRange);
    }
    if !striping_unit_fits_one_datagram(a.striping_unit) {
        return Err(ManagerError::StripingUnitTooLarge);
    }

    let mut free = state.free_disk_names_sorted();
    if free.len() < a.n {
        return Err(ManagerError::NotEnoughFreeDisks);
    }
    free.shuffle(&mut rand::rng());
    let chosen: Vec<String> = free.into_iter().take(a.n).collect();

    for name in &chosen {
        if let Some(disk) = state.disks.get_mut(name) {
            disk.state = DiskState::InDss {
                dss_name: a.dss_name.clone(),
            };
        }
    }

    state.dsses.insert(
        a.dss_name.clone(),
        DssRecord {
            dss_name: a.dss_name,
            n: a.n,
            striping_unit: a.striping_unit,
            disks: chosen.clone(),
            files: std::collections::HashMap::new(),
        },
    );

    Ok(ConfigureDssOk { disks: chosen })
}
