//! Command-line argument definitions for the manager binary.

use clap::Parser;

/// Cli defines the manager process's single positional argument.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// UDP port to listen on.
    pub manager_port: u16,
}
