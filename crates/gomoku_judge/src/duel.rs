//! Bot-vs-bot match: two processes, one arbiter, one terminal document.

use crate::arbiter::{GameArbiter, PlayerSlot};
use crate::config::JudgeConfig;
use crate::process::BotProcessHandle;
use crate::protocol::ProtocolChannel;
use anyhow::{Context, Result};
use gomoku_core::Symbol;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Referees two bot processes against each other and prints the terminal
/// outcome document on stdout.
#[instrument(skip_all, fields(first = %first.display(), second = %second.display(), first_symbol = %first_symbol))]
pub async fn run_duel(
    first: PathBuf,
    second: PathBuf,
    first_symbol: Symbol,
    config: JudgeConfig,
) -> Result<()> {
    info!("Starting bot-vs-bot match");

    let first_handle = match BotProcessHandle::spawn(&first, &config).await {
        Ok(handle) => handle,
        Err(e) => {
            emit_error(&e.to_string())?;
            anyhow::bail!("first bot startup failed: {e}");
        }
    };
    let mut first_channel = ProtocolChannel::new(first_handle, config.clone());

    let second_handle = match BotProcessHandle::spawn(&second, &config).await {
        Ok(handle) => handle,
        Err(e) => {
            // The first bot is already running; tear it down before leaving.
            first_channel.shutdown().await;
            emit_error(&e.to_string())?;
            anyhow::bail!("second bot startup failed: {e}");
        }
    };
    let second_channel = ProtocolChannel::new(second_handle, config);

    // O always moves first; the symbol argument decides which process is O.
    let mut arbiter = match first_symbol {
        Symbol::O => GameArbiter::new(
            PlayerSlot::Bot(first_channel),
            PlayerSlot::Bot(second_channel),
        ),
        Symbol::X => GameArbiter::new(
            PlayerSlot::Bot(second_channel),
            PlayerSlot::Bot(first_channel),
        ),
    };

    if let Err(e) = arbiter.drive().await {
        warn!(error = %e, "Match ended on a classified fault");
    }
    arbiter.shutdown().await;

    let outcome = arbiter.outcome();
    info!(
        moves = outcome.moves.len(),
        winner = ?outcome.winner,
        success = outcome.success,
        "Match finished"
    );

    let mut out = std::io::stdout();
    writeln!(out, "{}", serde_json::to_string(&outcome).context("failed to serialize outcome")?)
        .context("failed to write outcome document")?;
    out.flush().context("failed to flush outcome document")?;

    Ok(())
}

fn emit_error(message: &str) -> Result<()> {
    let mut out = std::io::stdout();
    writeln!(out, "{}", json!({ "error": message })).context("failed to write error record")?;
    out.flush().context("failed to flush error record")?;
    Ok(())
}
