//! UDP RPC helpers: one persistent socket for manager calls, one ephemeral
//! socket per worker task for block calls, per the stripe engine's
//! fan-out contract.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

use striped_core::error::UserError;
use striped_core::limits::{BLOCK_RPC_TIMEOUT, MAX_DATAGRAM_BYTES};
use striped_core::wire::{Reply, decode, encode};

/// Sends `req` over `socket` to `addr` and awaits a typed reply within
/// `timeout_dur`, collapsing the wire-level `{"status": ...}` envelope.
pub async fn call<Req, Resp>(
    socket: &UdpSocket,
    addr: SocketAddr,
    req: &Req,
    timeout_dur: Duration,
) -> Result<Resp, UserError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let start = Instant::now();
    let bytes = encode(req)?;
    socket.send_to(&bytes, addr).await?;

    let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];
    let len = match timeout(timeout_dur, socket.recv(&mut buf)).await {
        Ok(res) => res?,
        Err(_) => {
            warn!(%addr, elapsed = ?start.elapsed(), "rpc timed out");
            return Err(UserError::Timeout);
        }
    };
    debug!(%addr, elapsed = ?start.elapsed(), "rpc completed");

    let reply: Reply<Resp> = decode(&buf[..len])?;
    reply.into_result().map_err(UserError::Rejected)
}

/// Issues one block RPC (`write-block` or `read-block`) on a freshly bound
/// ephemeral socket. Called once per worker task inside a `JoinSet` so that
/// `n` concurrent block RPCs for one stripe never share a recv path.
pub async fn block_call<Req, Resp>(addr: SocketAddr, req: Req) -> Result<Resp, UserError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    call(&socket, addr, &req, BLOCK_RPC_TIMEOUT).await
}
