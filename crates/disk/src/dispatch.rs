//! Decode-dispatch-reply handling for the content-port request set.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use tracing::{debug, info, warn};

use striped_core::error::DiskError;
use striped_core::protocol::disk::*;
use striped_core::wire::{Ack, Reply, decode, encode};

use crate::store::Store;

/// Decodes, dispatches, and re-encodes one content-port request. Returns the
/// wire bytes to send back to the peer.
#[must_use]
pub fn handle_bytes(
    disk_name: &str,
    store: &mut Store,
    peer: std::net::SocketAddr,
    bytes: &[u8],
) -> Vec<u8> {
    let req: DiskRequest = match decode(bytes) {
        Ok(req) => req,
        Err(e) => {
            warn!(disk = disk_name, %peer, error = %e, "bad json");
            return reply_of(Err::<Ack, _>(DiskError::BadJson(e.to_string())));
        }
    };
    handle(disk_name, store, peer, req)
}

/// Encodes a handler's `Result` as wire bytes, mapping `Err` to
/// `{"status":"FAILURE","error": <display string>}` once at the dispatch edge.
fn reply_of<T: Serialize>(result: Result<T, DiskError>) -> Vec<u8> {
    match result {
        Ok(t) => encode(&Reply::ok(t)).unwrap(),
        Err(e) => encode(&Reply::<T>::err(e.to_string())).unwrap(),
    }
}

fn handle(
    disk_name: &str,
    store: &mut Store,
    peer: std::net::SocketAddr,
    req: DiskRequest,
) -> Vec<u8> {
    match req {
        DiskRequest::WriteBlock(a) => {
            debug!(
                disk = disk_name,
                %peer,
                file = %a.file_name,
                stripe = a.stripe_idx,
                slot = a.disk_index,
                "write-block"
            );
            reply_of(write_block(store, a))
        }

        DiskRequest::ReadBlock(a) => {
            debug!(
                disk = disk_name,
                %peer,
                file = %a.file_name,
                stripe = a.stripe_idx,
                slot = a.disk_index,
                "read-block"
            );
            reply_of(read_block(store, a))
        }

        DiskRequest::Fail(_) => {
            info!(disk = disk_name, %peer, "entering fail mode");
            store.fail();
            reply_of(Ok::<_, DiskError>(FailOk {
                event: "fail-complete".to_string(),
            }))
        }

        DiskRequest::Wipe(_) => {
            info!(disk = disk_name, %peer, "wipe");
            store.wipe();
            reply_of(Ok::<_, DiskError>(Ack {}))
        }

        DiskRequest::SetMode(a) => {
            info!(disk = disk_name, %peer, mode = ?a.state, "set-mode");
            store.set_mode(a.state);
            reply_of(Ok::<_, DiskError>(SetModeOk { mode: a.state }))
        }
    }
}

fn write_block(store: &mut Store, a: WriteBlockArgs) -> Result<Ack, DiskError> {
    if a.file_name.is_empty() {
        return Err(DiskError::InvalidFields);
    }
    let data = BASE64
        .decode(a.block_b64.as_bytes())
        .map_err(|e| DiskError::DecodeError(e.to_string()))?;
    store.write_block(a.file_name, a.stripe_idx, a.disk_index, data);
    Ok(Ack {})
}

fn read_block(store: &Store, a: ReadBlockArgs) -> Result<ReadBlockOk, DiskError> {
    if store.mode() == DiskMode::Fail {
        return Err(DiskError::SimulatedFailure);
    }
    let data = store
        .read_block(&a.file_name, a.stripe_idx, a.disk_index)
        .ok_or(DiskError::NotFound)?;
    Ok(ReadBlockOk {
        block_b64: BASE64.encode(data),
    })
}
