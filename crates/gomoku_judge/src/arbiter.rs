//! Turn arbitration and match state for one game.
//!
//! One arbiter owns one match outright: the board, both player slots, the
//! move log, and the standing. The same turn-step loop serves both
//! pairings — external-vs-bot and bot-vs-bot — by driving bot turns until
//! the match either needs external input or ends.

use crate::error::{InputError, MatchError};
use crate::protocol::ProtocolChannel;
use gomoku_core::{BOARD_SIZE, Board, Move, Symbol, check_win};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// One side of a match.
pub enum PlayerSlot {
    /// Moves arrive out-of-band through [`GameArbiter::submit_external`].
    External,
    /// Moves are fetched from a bot process.
    Bot(ProtocolChannel),
}

/// A recorded move, with win data when it ended the match.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    /// Row coordinate.
    pub x: usize,
    /// Column coordinate.
    pub y: usize,
    /// Which side placed the stone.
    pub symbol: Symbol,
    /// Set when this move completed five in a row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Symbol>,
    /// The winning run in geometric order, when `winner` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_cells: Option<Vec<(usize, usize)>>,
}

/// Where the match stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Standing {
    /// Waiting for the external player's move.
    AwaitingExternal,
    /// A bot's reply is being fetched.
    AwaitingBot,
    /// Someone completed five in a row.
    Won {
        /// The winning side.
        symbol: Symbol,
        /// The winning run in geometric order.
        cells: Vec<(usize, usize)>,
    },
    /// The board filled with no winner.
    Exhausted,
    /// A classified fault ended the match.
    Errored,
}

impl Standing {
    /// True once no further moves are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Standing::Won { .. } | Standing::Exhausted | Standing::Errored
        )
    }
}

/// Terminal record of a match, serialized as the duel output document.
#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    /// False when a classified error ended the match.
    pub success: bool,
    /// Every accepted move in order.
    pub moves: Vec<MoveRecord>,
    /// The winning symbol, if any.
    pub winner: Option<Symbol>,
    /// The winning run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_cells: Option<Vec<(usize, usize)>>,
    /// The classified error that ended the match, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Referee for one match.
pub struct GameArbiter {
    board: Board,
    o_player: PlayerSlot,
    x_player: PlayerSlot,
    turn: Symbol,
    moves: Vec<MoveRecord>,
    standing: Standing,
    error: Option<String>,
}

impl GameArbiter {
    /// Creates an arbiter. The first slot plays O and moves first.
    pub fn new(o_player: PlayerSlot, x_player: PlayerSlot) -> Self {
        let standing = match o_player {
            PlayerSlot::External => Standing::AwaitingExternal,
            PlayerSlot::Bot(_) => Standing::AwaitingBot,
        };
        Self {
            board: Board::new(),
            o_player,
            x_player,
            turn: Symbol::O,
            moves: Vec::new(),
            standing,
            error: None,
        }
    }

    /// Current standing of the match.
    pub fn standing(&self) -> &Standing {
        &self.standing
    }

    /// Accepted moves so far.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// The board, for callers that render or validate against it.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Drives bot turns until the match needs external input or ends.
    ///
    /// Returns the records accepted during this drive. A fatal fault marks
    /// the match `Errored` and surfaces the classified error; teardown is
    /// still the caller's obligation via [`GameArbiter::shutdown`].
    #[instrument(skip(self))]
    pub async fn drive(&mut self) -> Result<Vec<MoveRecord>, MatchError> {
        let mut accepted = Vec::new();

        loop {
            if self.standing.is_terminal() {
                return Ok(accepted);
            }

            if self.board.is_full() {
                info!(stones = self.board.stones(), "Board exhausted");
                self.standing = Standing::Exhausted;
                return Ok(accepted);
            }

            let turn = self.turn;
            let last_move = self.moves.last().map(|r| Move {
                x: r.x,
                y: r.y,
                symbol: r.symbol,
            });

            // Field-level borrows so the channel and the board can be used
            // together across the await.
            let slot = match turn {
                Symbol::O => &mut self.o_player,
                Symbol::X => &mut self.x_player,
            };
            let channel = match slot {
                PlayerSlot::External => {
                    self.standing = Standing::AwaitingExternal;
                    return Ok(accepted);
                }
                PlayerSlot::Bot(channel) => channel,
            };

            self.standing = Standing::AwaitingBot;
            debug!(symbol = %turn, "Requesting move from bot");

            // No prior move means this bot opens the game.
            let fetched = match last_move {
                None => channel.opening_move(&self.board, turn).await,
                Some(opponent) => channel.request_move(opponent, &self.board, turn).await,
            };

            let mv = match fetched {
                Ok(mv) => mv,
                Err(e) => {
                    warn!(error = %e, symbol = %turn, "Bot turn failed, match errored");
                    self.standing = Standing::Errored;
                    self.error = Some(e.to_string());
                    return Err(e);
                }
            };

            let record = self.apply(mv);
            accepted.push(record);
        }
    }

    /// Validates and applies an externally supplied move.
    ///
    /// Rejection mutates nothing and does not advance the turn; the bot is
    /// never consulted for a winning external move.
    #[instrument(skip(self))]
    pub fn submit_external(&mut self, x: i64, y: i64) -> Result<MoveRecord, InputError> {
        if self.standing.is_terminal() {
            return Err(InputError::MatchOver);
        }
        if !matches!(self.slot(self.turn), PlayerSlot::External) {
            warn!(symbol = %self.turn, "External move submitted out of turn");
            return Err(InputError::NotExternalTurn);
        }
        if !Board::contains(x, y) || !self.board.is_empty_cell(x as usize, y as usize) {
            debug!(x, y, "Rejecting invalid external move");
            return Err(InputError::InvalidMove);
        }

        let record = self.apply(Move {
            x: x as usize,
            y: y as usize,
            symbol: self.turn,
        });
        Ok(record)
    }

    /// Applies a validated move: board update, win check, record, alternate.
    fn apply(&mut self, mv: Move) -> MoveRecord {
        // Already validated against vacancy and range; the board re-checks
        // as its own invariant.
        if let Err(e) = self.board.place(mv.x, mv.y, mv.symbol) {
            // Unreachable by construction; surface loudly in debug runs.
            debug_assert!(false, "validated move rejected by board: {e}");
            warn!(error = %e, "Validated move rejected by board");
        }

        let win = check_win(&self.board, mv.x, mv.y, mv.symbol);
        let record = MoveRecord {
            x: mv.x,
            y: mv.y,
            symbol: mv.symbol,
            winner: win.as_ref().map(|_| mv.symbol),
            winning_cells: win.clone(),
        };
        self.moves.push(record.clone());

        match win {
            Some(cells) => {
                info!(symbol = %mv.symbol, "Five in a row, match won");
                self.standing = Standing::Won {
                    symbol: mv.symbol,
                    cells,
                };
            }
            None => {
                self.turn = mv.symbol.opponent();
                self.standing = match self.slot(self.turn) {
                    PlayerSlot::External => Standing::AwaitingExternal,
                    PlayerSlot::Bot(_) => Standing::AwaitingBot,
                };
                if self.board.stones() == BOARD_SIZE * BOARD_SIZE {
                    self.standing = Standing::Exhausted;
                }
            }
        }

        record
    }

    /// Terminal report for the match. Meaningful once the standing is
    /// terminal; the duel front-end serializes it as the output document.
    pub fn outcome(&self) -> GameOutcome {
        let (winner, winning_cells) = match &self.standing {
            Standing::Won { symbol, cells } => (Some(*symbol), Some(cells.clone())),
            _ => (None, None),
        };
        GameOutcome {
            success: self.error.is_none(),
            moves: self.moves.clone(),
            winner,
            winning_cells,
            error: self.error.clone(),
        }
    }

    /// Tears down every bot slot. Idempotent, runs on every exit path.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) {
        if let PlayerSlot::Bot(channel) = &mut self.o_player {
            channel.shutdown().await;
        }
        if let PlayerSlot::Bot(channel) = &mut self.x_player {
            channel.shutdown().await;
        }
    }

    fn slot(&self, symbol: Symbol) -> &PlayerSlot {
        match symbol {
            Symbol::O => &self.o_player,
            Symbol::X => &self.x_player,
        }
    }
}
