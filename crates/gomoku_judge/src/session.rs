//! Interactive session: line-delimited JSON over stdin/stdout.
//!
//! Stdout carries the caller protocol, one record per line; every
//! diagnostic goes to stderr via tracing. Malformed input and invalid
//! moves are rejected locally and the session continues; classified match
//! faults end the match, and teardown runs on every exit path.

use crate::arbiter::{GameArbiter, MoveRecord, PlayerSlot, Standing};
use crate::config::JudgeConfig;
use crate::error::InputError;
use crate::process::BotProcessHandle;
use crate::protocol::ProtocolChannel;
use anyhow::{Context, Result};
use gomoku_core::Symbol;
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, instrument, warn};

/// Input token that ends the session.
const EXIT_TOKEN: &str = "exit";

/// One externally supplied move.
#[derive(Debug, Deserialize)]
struct ExternalMove {
    x: i64,
    y: i64,
}

/// Runs a match between one bot process and an external player driven
/// over stdin/stdout.
#[instrument(skip_all, fields(bot = %bot.display(), external_symbol = %external_symbol))]
pub async fn run_interactive(
    bot: PathBuf,
    external_symbol: Symbol,
    config: JudgeConfig,
) -> Result<()> {
    info!("Starting interactive match");

    let bot_symbol = external_symbol.opponent();
    let handle = match BotProcessHandle::spawn(&bot, &config).await {
        Ok(handle) => handle,
        Err(e) => {
            emit(&json!({ "error": e.to_string() }))?;
            anyhow::bail!("bot startup failed: {e}");
        }
    };
    let channel = ProtocolChannel::new(handle, config);

    let mut arbiter = match bot_symbol {
        Symbol::O => GameArbiter::new(PlayerSlot::Bot(channel), PlayerSlot::External),
        Symbol::X => GameArbiter::new(PlayerSlot::External, PlayerSlot::Bot(channel)),
    };

    let result = session_loop(&mut arbiter).await;
    arbiter.shutdown().await;
    result
}

/// Reads caller records until `exit`, EOF, or a fatal match fault.
async fn session_loop(arbiter: &mut GameArbiter) -> Result<()> {
    // A bot holding O opens before the first caller record arrives.
    match arbiter.drive().await {
        Ok(records) => {
            for record in &records {
                emit(&json!({ "x": record.x, "y": record.y, "initial": true }))?;
            }
        }
        Err(e) => {
            emit(&json!({ "error": e.to_string() }))?;
            anyhow::bail!("match errored during opening: {e}");
        }
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await.context("failed to read caller input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == EXIT_TOKEN {
            info!("Caller ended the session");
            break;
        }

        let mv: ExternalMove = match serde_json::from_str(line) {
            Ok(mv) => mv,
            Err(e) => {
                debug!(error = %e, line, "Malformed caller input");
                emit(&json!({ "error": InputError::InvalidFormat.to_string() }))?;
                continue;
            }
        };

        match arbiter.submit_external(mv.x, mv.y) {
            Err(e) => {
                debug!(error = %e, "External move rejected");
                emit(&json!({ "error": e.to_string() }))?;
            }
            Ok(record) if record.winner.is_some() => {
                // The external move ended the match; the bot is not consulted.
                emit(&external_win_record(&record))?;
            }
            Ok(_) => match arbiter.drive().await {
                Ok(records) => emit(&step_record(&records, arbiter.standing()))?,
                Err(e) => {
                    warn!(error = %e, "Match errored");
                    emit(&json!({ "error": e.to_string() }))?;
                }
            },
        }
    }

    Ok(())
}

/// Record for an external move that won (or exhausted) the match: there is
/// no bot reply, so the coordinates are the `-1` sentinel.
fn external_win_record(record: &MoveRecord) -> Value {
    json!({
        "x": -1,
        "y": -1,
        "winner": record.winner,
        "winning_cells": record.winning_cells,
    })
}

/// Record for a completed turn step: the bot's reply plus win data.
fn step_record(records: &[MoveRecord], standing: &Standing) -> Value {
    match records.last() {
        Some(record) => {
            let mut value = json!({
                "x": record.x,
                "y": record.y,
                "winner": record.winner,
            });
            if let Some(cells) = &record.winning_cells {
                value["winning_cells"] = json!(cells);
            }
            value
        }
        // No bot reply was needed: the external move filled the board.
        None if *standing == Standing::Exhausted => {
            json!({ "x": -1, "y": -1, "winner": Value::Null })
        }
        None => json!({ "error": "no move was produced" }),
    }
}

/// Writes one protocol record to stdout, newline-terminated and flushed.
fn emit(record: &Value) -> Result<()> {
    let mut out = std::io::stdout();
    writeln!(out, "{record}").context("failed to write caller record")?;
    out.flush().context("failed to flush caller record")?;
    Ok(())
}
