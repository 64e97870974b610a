//! Command-line argument definitions for the disk binary.

use clap::Parser;

/// Cli defines the disk process's positional startup arguments:
/// its own name, the manager's endpoint, and the two ports it serves on.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// This disk's name, registered with the manager.
    pub disk_name: String,
    /// Manager's IP address.
    pub manager_ip: String,
    /// Manager's UDP port.
    pub manager_port: u16,
    /// This disk's own management port (registration only).
    pub my_m_port: u16,
    /// This disk's own content port (block read/write/fail/wipe/set-mode).
    pub my_c_port: u16,
}
