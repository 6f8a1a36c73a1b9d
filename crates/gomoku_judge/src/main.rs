//! Gomoku Judge - Connection-five referee CLI.

use anyhow::Result;
use clap::Parser;
use gomoku_judge::cli::{Cli, Command};
use gomoku_judge::config::JudgeConfig;
use gomoku_judge::{duel, session};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stdout carries the caller protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match &cli.config {
        Some(path) => JudgeConfig::from_file(path)?,
        None => JudgeConfig::default(),
    };
    info!(?config, "Judge starting");

    match cli.command {
        Command::Interactive { bot, symbol } => {
            session::run_interactive(bot, symbol, config).await
        }
        Command::Duel {
            first,
            second,
            first_symbol,
        } => duel::run_duel(first, second, first_symbol, config).await,
    }
}
