//! `notes`: command-line client for the notes API.
//!
//! Usage:
//!   notes --base-url http://localhost:8000/api/v1 login a@b.com --password secret
//!   notes notes list

use anyhow::Result;
use clap::Parser;
use notes_cli::{Cli, log_directives, run};
use notes_client::NotesClient;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let directives = log_directives(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(directives))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = cli.config()?;
    debug!("Using API at {}", config.normalized_base_url());
    let client = NotesClient::from_config(&config)?;

    let mut stdout = std::io::stdout().lock();
    run(&client, cli.command, cli.json, &mut stdout).await
}
