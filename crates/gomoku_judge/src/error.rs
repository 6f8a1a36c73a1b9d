//! Fault taxonomy for the judge.
//!
//! Startup faults abort a match before the first move; process and protocol
//! faults end a running match; input faults are rejected locally and the
//! session continues. Every fault reaching a caller is one of these — raw
//! I/O errors never escape unclassified.

use derive_more::{Display, Error, From};

/// Failures that prevent a match from ever starting.
#[derive(Debug, Clone, Display, Error)]
pub enum StartupError {
    /// The bot executable does not exist.
    #[display("bot executable not found: {}", path)]
    NotFound {
        /// Path that was resolved.
        path: String,
    },
    /// The executable lacks execute permission and the fix-up failed.
    #[display("bot executable is not runnable: {}", path)]
    PermissionDenied {
        /// Path that was resolved.
        path: String,
    },
    /// No handshake line arrived within the startup window.
    #[display("bot produced no handshake within {}s; stderr: {}", seconds, stderr)]
    Timeout {
        /// Startup window that elapsed.
        seconds: u64,
        /// Captured diagnostic-stream contents.
        stderr: String,
    },
    /// The process exited before completing the handshake.
    #[display("bot exited during startup; stderr: {}", stderr)]
    CrashedDuringStartup {
        /// Captured diagnostic-stream contents.
        stderr: String,
    },
    /// The first line was not the readiness token.
    #[display("unexpected handshake line: {:?}", line)]
    UnexpectedHandshake {
        /// What the bot actually printed.
        line: String,
    },
}

/// Failures of the bot process itself. Fatal immediately.
#[derive(Debug, Clone, Display, Error)]
pub enum ProcessError {
    /// Writing to the bot's input stream failed.
    #[display("broken pipe writing to bot")]
    BrokenPipe,
    /// The process was found dead.
    #[display("bot process died; stderr: {}", stderr)]
    Died {
        /// Captured diagnostic-stream contents.
        stderr: String,
    },
}

/// Protocol failures, raised once the retry budget is spent.
#[derive(Debug, Clone, Display, Error)]
pub enum ProtocolError {
    /// The reply was not two whitespace-separated integers.
    #[display("malformed reply from bot: {:?}; stderr: {}", line, stderr)]
    MalformedReply {
        /// The offending line.
        line: String,
        /// Captured diagnostic-stream contents.
        stderr: String,
    },
    /// The reply parsed but named an out-of-range or occupied cell.
    #[display("bot played an illegal move: {} {}", x, y)]
    IllegalMove {
        /// Claimed row coordinate.
        x: i64,
        /// Claimed column coordinate.
        y: i64,
    },
    /// Every attempt came back empty or silent.
    #[display("bot gave no response after {} attempts", attempts)]
    NoResponse {
        /// Attempts that were made.
        attempts: u32,
    },
}

/// Rejected caller input. Recoverable: nothing mutates, the session continues.
#[derive(Debug, Clone, Display, Error)]
pub enum InputError {
    /// The move targets a cell outside the board or already occupied.
    #[display("invalid move")]
    InvalidMove,
    /// The input line was not a well-formed move record.
    #[display("invalid input format")]
    InvalidFormat,
    /// The match has already ended; only teardown is permitted.
    #[display("match is already over")]
    MatchOver,
    /// A move was submitted while it is not the external player's turn.
    #[display("not awaiting an external move")]
    NotExternalTurn,
}

/// Any classified fault that ends a match.
#[derive(Debug, Clone, Display, Error, From)]
pub enum MatchError {
    /// The match never started.
    #[display("{}", _0)]
    Startup(StartupError),
    /// The bot process failed mid-match.
    #[display("{}", _0)]
    Process(ProcessError),
    /// The bot violated the move protocol.
    #[display("{}", _0)]
    Protocol(ProtocolError),
}
