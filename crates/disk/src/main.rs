use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::net::UdpSocket;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use disk::cli::Cli;
use disk::dispatch;
use disk::store::Store;
use striped_core::limits::MAX_DATAGRAM_BYTES;
use striped_core::protocol::manager::{ManagerRequest, RegisterDiskArgs};
use striped_core::wire::{Ack, Reply, decode, encode};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "disk exiting");
        return Err(e);
    }
    Ok(())
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    register_with_manager(&cli).await?;

    let socket = UdpSocket::bind(("0.0.0.0", cli.my_c_port))
        .await
        .with_context(|| format!("binding content port {}", cli.my_c_port))?;
    info!(disk = %cli.disk_name, port = cli.my_c_port, "disk listening");

    let mut store = Store::new();
    let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];

    loop {
        let (len, peer) = socket
            .recv_from(&mut buf)
            .await
            .context("receiving datagram")?;
        let reply = dispatch::handle_bytes(&cli.disk_name, &mut store, peer, &buf[..len]);
        if let Err(e) = socket.send_to(&reply, peer).await {
            error!(%peer, error = %e, "failed to send reply");
        }
    }
}

async fn register_with_manager(cli: &Cli) -> Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", cli.my_m_port))
        .await
        .with_context(|| format!("binding management port {}", cli.my_m_port))?;
    let manager_addr = (cli.manager_ip.as_str(), cli.manager_port);

    let req = ManagerRequest::RegisterDisk(RegisterDiskArgs {
        disk_name: cli.disk_name.clone(),
        ip: local_ip_hint(),
        m_port: cli.my_m_port,
        c_port: cli.my_c_port,
    });
    let bytes = encode(&req).context("encoding register-disk")?;
    socket
        .send_to(&bytes, manager_addr)
        .await
        .context("sending register-disk")?;

    let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];
    let len = socket
        .recv(&mut buf)
        .await
        .context("receiving register-disk reply")?;
    let reply: Reply<Ack> = decode(&buf[..len]).context("decoding register-disk reply")?;
    if let Err(e) = reply.into_result() {
        bail!("manager rejected registration: {e}");
    }
    info!(disk = %cli.disk_name, manager = %cli.manager_ip, "registered with manager");
    Ok(())
}

/// The reference implementation advertises `127.0.0.1` since every role in a
/// demo deployment runs on localhost under distinct ports.
fn local_ip_hint() -> String {
    "127.0.0.1".to_string()
}
