use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use manager::cli::Cli;
use manager::{dispatch, state::ManagerState};
use striped_core::limits::MAX_DATAGRAM_BYTES;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "manager exiting");
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
    let socket = UdpSocket::bind(("0.0.0.0", cli.manager_port))
        .await
        .with_context(|| format!("binding manager UDP port {}", cli.manager_port))?;
    info!(port = cli.manager_port, "manager listening");

    let mut state = ManagerState::new();
    let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];

    loop {
        let (len, peer) = socket
            .recv_from(&mut buf)
            .await
            .context("receiving datagram")?;
        let reply = dispatch::handle_bytes(&mut state, peer, &buf[..len]);
        if let Err(e) = socket.send_to(&reply, peer).await {
            error!(%peer, error = %e, "failed to send reply");
        }
    }
}
