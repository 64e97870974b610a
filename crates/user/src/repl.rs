//! Thin shell: read a line, dispatch through the engine, print the result.
//! The parsing of each line and the core engine it calls are both
//! exercised by integration tests; this module is the read/print loop
//! around them.

use std::path::Path;

use tracing::warn;

use crate::cli::ReplCommand;
use crate::engine::Client;

/// Executes one parsed REPL command against `client`, returning the text to
/// print. Every engine-level failure is logged at `warn` and also returned
/// in the printed string, matching the ambient convention that user-visible
/// failures are both logged and surfaced to the caller.
pub async fn dispatch(client: &Client, cmd: ReplCommand) -> String {
    let result = run(client, cmd).await;
    match result {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, "command failed");
            format!("error: {e}")
        }
    }
}

async fn run(client: &Client, cmd: ReplCommand) -> anyhow::Result<String> {
    match cmd {
        ReplCommand::Ls => {
            let snapshot = client.ls().await?;
            Ok(format!(
                "{} users, {} disks, {} dsses, {} free disks",
                snapshot.users.len(),
                snapshot.disks.len(),
                snapshot.dsses.len(),
                snapshot.free_disks.len()
            ))
        }
        ReplCommand::Configure { dss_name, n, b } => {
            let ok = client.configure_dss(&dss_name, n, b).await?;
            Ok(format!("configured {dss_name} on disks {:?}", ok.disks))
        }
        ReplCommand::Copy { dss_name, path } => {
            client.copy(&dss_name, &path).await?;
            Ok(format!("copied {} into {dss_name}", path.display()))
        }
        ReplCommand::Read {
            dss_name,
            file_name,
            out,
            p,
        } => {
            client.read(&dss_name, &file_name, &out, p).await?;
            Ok(format!("read {file_name} from {dss_name} into {}", display(&out)))
        }
        ReplCommand::DiskFailure { dss_name } => {
            client.disk_failure_drill(&dss_name).await?;
            Ok(format!("recovered {dss_name}"))
        }
        ReplCommand::Decommission { dss_name } => {
            client.decommission(&dss_name).await?;
            Ok(format!("decommissioned {dss_name}"))
        }
        ReplCommand::Deregister => {
            client.deregister().await?;
            Ok("deregistered".to_string())
        }
        ReplCommand::Quit => Ok("bye".to_string()),
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
