use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use user::cli::{Cli, ReplCommand, parse_repl_line};
use user::engine::Client;
use user::repl;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "user exiting");
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
    let manager_addr = format!("{}:{}", cli.manager_ip, cli.manager_port).parse()?;
    let client = Client::bind(cli.user_name.clone(), manager_addr, cli.my_m_port).await?;
    client
        .register("127.0.0.1".to_string(), cli.my_m_port, cli.my_c_port)
        .await?;
    info!(user = %cli.user_name, manager = %cli.manager_ip, "registered with manager");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_repl_line(&line) {
            Ok(ReplCommand::Quit) => break,
            Ok(cmd) => println!("{}", repl::dispatch(&client, cmd).await),
            Err(e) => println!("error: {e}"),
        }
    }
    Ok(())
}
