//! Retried, classified move exchange over the bot line protocol.
//!
//! The protocol is half-duplex per turn: one write (the opponent's move or
//! the start token), then bounded read attempts until a reply settles or
//! the budget is spent. Each read is preceded by a liveness check; a dead
//! process short-circuits the remaining attempts.

use crate::config::JudgeConfig;
use crate::error::{MatchError, ProtocolError};
use crate::process::{BotProcessHandle, START_TOKEN};
use crate::retry::{self, Attempt};
use gomoku_core::{Board, Move, Symbol};
use tracing::{debug, instrument, warn};

/// One bot's side of the line protocol.
pub struct ProtocolChannel {
    handle: BotProcessHandle,
    config: JudgeConfig,
}

impl ProtocolChannel {
    /// Wraps a handshaken process handle.
    pub fn new(handle: BotProcessHandle, config: JudgeConfig) -> Self {
        Self { handle, config }
    }

    /// Sends the start token and fetches the opening move.
    #[instrument(skip_all)]
    pub async fn opening_move(&mut self, board: &Board, symbol: Symbol) -> Result<Move, MatchError> {
        self.handle.write_line(START_TOKEN).await?;
        self.read_move(board, symbol).await
    }

    /// Relays the opponent's move and fetches the reply.
    #[instrument(skip(self, board), fields(x = opponent.x, y = opponent.y))]
    pub async fn request_move(
        &mut self,
        opponent: Move,
        board: &Board,
        symbol: Symbol,
    ) -> Result<Move, MatchError> {
        self.handle
            .write_line(&format!("{} {}", opponent.x, opponent.y))
            .await?;
        self.read_move(board, symbol).await
    }

    /// Tears down the underlying process with the configured grace period.
    pub async fn shutdown(&mut self) {
        self.handle.shutdown(self.config.shutdown_grace()).await;
    }

    /// Bounded read attempts, classifying each reply against the board.
    async fn read_move(&mut self, board: &Board, symbol: Symbol) -> Result<Move, MatchError> {
        let attempts = *self.config.max_attempts();
        let delay = self.config.retry_delay();
        let reply_timeout = self.config.reply_timeout();

        retry::bounded(attempts, delay, async |_attempt| {
            let line = match self.handle.read_line(reply_timeout).await {
                Err(e) => return Err(MatchError::from(e)),
                Ok(None) => {
                    return Ok(Attempt::Transient(
                        ProtocolError::NoResponse { attempts }.into(),
                    ));
                }
                Ok(Some(line)) => line.trim().to_string(),
            };

            if line.is_empty() {
                debug!("Empty reply line");
                return Ok(Attempt::Transient(
                    ProtocolError::NoResponse { attempts }.into(),
                ));
            }

            let Some((x, y)) = parse_coordinates(&line) else {
                warn!(line, "Unparseable reply from bot");
                return Ok(Attempt::Transient(
                    ProtocolError::MalformedReply {
                        line,
                        stderr: self.handle.diagnostics(),
                    }
                    .into(),
                ));
            };

            if !Board::contains(x, y) || !board.is_empty_cell(x as usize, y as usize) {
                warn!(x, y, "Bot named an out-of-range or occupied cell");
                return Ok(Attempt::Transient(
                    ProtocolError::IllegalMove { x, y }.into(),
                ));
            }

            Ok(Attempt::Settled(Move {
                x: x as usize,
                y: y as usize,
                symbol,
            }))
        })
        .await
    }
}

/// Parses a reply of the form `"<x> <y>"`. Anything else is malformed.
fn parse_coordinates(line: &str) -> Option<(i64, i64)> {
    let mut parts = line.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}
