//! Protocol channel: retried reads and fault classification.

mod common;

use common::{fast_config, script_bot};
use gomoku_core::{Board, Move, Symbol};
use gomoku_judge::error::{MatchError, ProcessError, ProtocolError};
use gomoku_judge::process::BotProcessHandle;
use gomoku_judge::protocol::ProtocolChannel;
use tempfile::TempDir;

async fn spawn_channel(dir: &TempDir, name: &str, body: &str) -> ProtocolChannel {
    let bot = script_bot(dir, name, body);
    let handle = BotProcessHandle::spawn(&bot, &fast_config())
        .await
        .expect("handshake");
    ProtocolChannel::new(handle, fast_config())
}

#[tokio::test]
async fn three_empty_replies_classify_as_no_response() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "mute_bot",
        "echo ready\nread line\necho\necho\necho\nsleep 30\n",
    )
    .await;

    let board = Board::new();
    let err = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect_err("empty replies must exhaust the budget");
    assert!(matches!(
        err,
        MatchError::Protocol(ProtocolError::NoResponse { attempts: 3 })
    ));

    // Teardown still terminates the process.
    channel.shutdown().await;
}

#[tokio::test]
async fn garbage_reply_classifies_as_malformed() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "garbage_bot",
        "echo ready\nread line\necho not a move\necho not a move\necho not a move\nsleep 30\n",
    )
    .await;

    let board = Board::new();
    let err = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect_err("garbage must exhaust the budget");
    match err {
        MatchError::Protocol(ProtocolError::MalformedReply { line, .. }) => {
            assert_eq!(line, "not a move");
        }
        other => panic!("expected MalformedReply, got {other:?}"),
    }

    channel.shutdown().await;
}

#[tokio::test]
async fn out_of_range_reply_classifies_as_illegal() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "offboard_bot",
        "echo ready\nread line\necho 99 99\necho 99 99\necho 99 99\nsleep 30\n",
    )
    .await;

    let board = Board::new();
    let err = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect_err("off-board moves are illegal");
    assert!(matches!(
        err,
        MatchError::Protocol(ProtocolError::IllegalMove { x: 99, y: 99 })
    ));

    channel.shutdown().await;
}

#[tokio::test]
async fn occupied_cell_reply_classifies_as_illegal() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "squatter_bot",
        "echo ready\nread line\necho 7 7\necho 7 7\necho 7 7\nsleep 30\n",
    )
    .await;

    let mut board = Board::new();
    board.place(7, 7, Symbol::X).unwrap();

    let err = channel
        .request_move(Move { x: 7, y: 7, symbol: Symbol::X }, &board, Symbol::O)
        .await
        .expect_err("occupied cells are illegal");
    assert!(matches!(
        err,
        MatchError::Protocol(ProtocolError::IllegalMove { x: 7, y: 7 })
    ));

    channel.shutdown().await;
}

#[tokio::test]
async fn death_after_handshake_short_circuits() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "quitter_bot",
        "echo ready\nread line\nexit 0\n",
    )
    .await;

    let board = Board::new();
    let err = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect_err("a dead bot cannot reply");
    assert!(
        matches!(
            err,
            MatchError::Process(ProcessError::Died { .. })
                | MatchError::Process(ProcessError::BrokenPipe)
        ),
        "expected a process fault, got {err:?}"
    );

    channel.shutdown().await;
}

#[tokio::test]
async fn empty_line_then_reply_settles() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "hesitant_bot",
        "echo ready\nread line\necho\necho 3 4\nread line\n",
    )
    .await;

    let board = Board::new();
    let mv = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect("the second attempt settles");
    assert_eq!((mv.x, mv.y, mv.symbol), (3, 4, Symbol::O));

    channel.shutdown().await;
}

#[tokio::test]
async fn full_exchange_round() {
    let dir = TempDir::new().unwrap();
    let mut channel = spawn_channel(
        &dir,
        "steady_bot",
        "echo ready\nread line\necho 7 7\nread line\necho 8 8\nread line\n",
    )
    .await;

    let mut board = Board::new();
    let opening = channel
        .opening_move(&board, Symbol::O)
        .await
        .expect("opening move");
    assert_eq!((opening.x, opening.y), (7, 7));
    board.place(opening.x, opening.y, opening.symbol).unwrap();

    board.place(7, 8, Symbol::X).unwrap();
    let reply = channel
        .request_move(Move { x: 7, y: 8, symbol: Symbol::X }, &board, Symbol::O)
        .await
        .expect("reply move");
    assert_eq!((reply.x, reply.y, reply.symbol), (8, 8, Symbol::O));

    channel.shutdown().await;
}
