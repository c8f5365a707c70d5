//! Strictly Ultimate - unified CLI
//!
//! Hosts a move authority or plays a match against one.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use strictly_ultimate_server::{
    InMemoryAuthority, MatchOrchestrator, MoveAuthority, RestAuthority, UltimateConfig, play,
    server,
};
use tokio::io::BufReader;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = UltimateConfig::load(Some(cli.config.as_path()))?;

    match cli.command {
        Command::Serve { port, host } => run_server(config.with_bind(host, port)).await,
        Command::Play {
            authority_url,
            local,
        } => {
            let config = match authority_url {
                Some(url) => config.with_authority_url(url),
                None => config,
            };
            run_play(config, local).await
        }
    }
}

/// Run the HTTP move authority
async fn run_server(config: UltimateConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(host = %config.host(), port = config.port(), "Starting move authority");
    server::serve(config.host().clone(), *config.port()).await
}

/// Run the terminal front end
#[instrument(skip_all, fields(local = local))]
async fn run_play(config: UltimateConfig, local: bool) -> Result<()> {
    // Log to a file so the board stays readable
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    let authority: Arc<dyn MoveAuthority> = if local {
        info!("Using in-process authority");
        Arc::new(InMemoryAuthority::new())
    } else {
        info!(url = %config.authority_url(), "Using remote authority");
        Arc::new(RestAuthority::new(
            config.authority_url(),
            config.request_timeout(),
        )?)
    };

    let mut orch = MatchOrchestrator::new(authority).await;
    play::run_session(
        &mut orch,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
