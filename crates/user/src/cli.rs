//! Command-line argument definitions for the user binary: the startup
//! positional arguments, and the interactive REPL command enum reused for
//! each typed line of the shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cli defines the user process's positional startup arguments.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// This user's name, registered with the manager.
    pub user_name: String,
    /// Manager's IP address.
    pub manager_ip: String,
    /// Manager's UDP port.
    pub manager_port: u16,
    /// This user's own management port.
    pub my_m_port: u16,
    /// This user's own content port (unused for block RPCs, which bind
    /// their own ephemeral sockets, but registered with the manager for
    /// symmetry with disks and future peer-to-peer use).
    pub my_c_port: u16,
}

/// One line of the interactive REPL, parsed with the same `clap::Parser`
/// machinery used for process startup rather than a hand-rolled
/// `split_whitespace` match.
#[derive(Parser)]
#[command(no_binary_name = true)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Subcommand)]
pub enum ReplCommand {
    /// List users, disks, and DSSes known to the manager.
    Ls,
    /// Configure a new DSS of `n` disks with striping unit `b`.
    Configure { dss_name: String, n: usize, b: u64 },
    /// Stripe a local file into the named DSS.
    Copy { dss_name: String, path: PathBuf },
    /// Read a file back from the named DSS, optionally fault-injecting at `p` percent.
    Read {
        dss_name: String,
        file_name: String,
        out: PathBuf,
        p: Option<u8>,
    },
    /// Inject a simulated disk failure and drive recovery.
    DiskFailure { dss_name: String },
    /// Decommission a DSS, freeing its disks.
    Decommission { dss_name: String },
    /// Deregister this user from the manager.
    Deregister,
    /// Exit the shell.
    Quit,
}

/// Tokenizes one REPL line with shell-style quoting and parses it into a
/// [`ReplCommand`].
///
/// # Errors
/// Returns an error if the line cannot be tokenized or does not match any
/// known subcommand.
pub fn parse_repl_line(line: &str) -> anyhow::Result<ReplCommand> {
    let tokens =
        shlex::split(line).ok_or_else(|| anyhow::anyhow!("unterminated quote in input"))?;
    let parsed = ReplLine::try_parse_from(tokens)?;
    Ok(parsed.command)
}
