//! End-to-end interactive sessions over the real binary.

mod common;

use common::script_bot;
use serde_json::{Value, json};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Runs `gomoku_judge interactive` feeding `input` on stdin; returns the
/// parsed stdout records.
fn run_session(bot: &std::path::Path, external_symbol: &str, input: &str) -> Vec<Value> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gomoku_judge"))
        .arg("interactive")
        .arg(bot)
        .arg(external_symbol)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn judge");

    child
        .stdin
        .take()
        .expect("judge stdin")
        .write_all(input.as_bytes())
        .expect("write caller input");

    let output = child.wait_with_output().expect("judge output");
    assert!(output.status.success(), "judge exited with {:?}", output.status);

    String::from_utf8(output.stdout)
        .expect("utf8 records")
        .lines()
        .map(|line| serde_json::from_str(line).expect("record is JSON"))
        .collect()
}

#[test]
fn bot_opening_and_reply_round() {
    let dir = TempDir::new().unwrap();
    let bot = script_bot(
        &dir,
        "opener_bot",
        "echo ready\nread line\necho 7 7\nread line\necho 8 8\nread line\n",
    );

    // The bot holds O and opens; the external player is X.
    let records = run_session(&bot, "X", "{\"x\": 7, \"y\": 8}\nexit\n");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], json!({ "x": 7, "y": 7, "initial": true }));
    assert_eq!(records[1], json!({ "x": 8, "y": 8, "winner": null }));
}

#[test]
fn occupied_cell_is_rejected_and_the_session_continues() {
    let dir = TempDir::new().unwrap();
    let bot = script_bot(
        &dir,
        "opener_bot",
        "echo ready\nread line\necho 7 7\nread line\necho 8 8\nread line\n",
    );

    // First caller move targets the bot's opening stone.
    let records = run_session(
        &bot,
        "X",
        "{\"x\": 7, \"y\": 7}\n{\"x\": 7, \"y\": 8}\nexit\n",
    );

    assert_eq!(records.len(), 3);
    assert_eq!(records[0], json!({ "x": 7, "y": 7, "initial": true }));
    assert!(records[1]["error"].is_string(), "rejection record: {}", records[1]);
    assert_eq!(records[2], json!({ "x": 8, "y": 8, "winner": null }));
}

#[test]
fn malformed_input_is_recoverable() {
    let dir = TempDir::new().unwrap();
    let bot = script_bot(
        &dir,
        "opener_bot",
        "echo ready\nread line\necho 7 7\nread line\necho 8 8\nread line\n",
    );

    let records = run_session(&bot, "X", "not json\n{\"x\": 7, \"y\": 8}\nexit\n");

    assert_eq!(records.len(), 3);
    assert!(records[1]["error"].is_string());
    assert_eq!(records[2], json!({ "x": 8, "y": 8, "winner": null }));
}

#[test]
fn external_win_reports_the_sentinel_record() {
    let dir = TempDir::new().unwrap();
    // The external player holds O; the bot shadows on row 10 and never wins.
    let bot = script_bot(
        &dir,
        "shadow_bot",
        "echo ready\n\
         read line\n\
         echo 10 0\n\
         read line\n\
         echo 10 1\n\
         read line\n\
         echo 10 2\n\
         read line\n\
         echo 10 3\n\
         read line\n",
    );

    let input = "{\"x\": 0, \"y\": 0}\n\
                 {\"x\": 0, \"y\": 1}\n\
                 {\"x\": 0, \"y\": 2}\n\
                 {\"x\": 0, \"y\": 3}\n\
                 {\"x\": 0, \"y\": 4}\n\
                 exit\n";
    let records = run_session(&bot, "O", input);

    assert_eq!(records.len(), 5);
    for (i, record) in records.iter().take(4).enumerate() {
        assert_eq!(record["x"], json!(10), "bot reply {i}");
        assert_eq!(record["winner"], Value::Null);
    }
    assert_eq!(
        records[4],
        json!({
            "x": -1,
            "y": -1,
            "winner": "O",
            "winning_cells": [[0, 0], [0, 1], [0, 2], [0, 3], [0, 4]],
        })
    );
}

#[test]
fn missing_bot_reports_an_error_record_and_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no_such_bot");

    let output = Command::new(env!("CARGO_BIN_EXE_gomoku_judge"))
        .arg("interactive")
        .arg(&missing)
        .arg("X")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .expect("run judge");

    assert!(!output.status.success());
    let record: Value = serde_json::from_slice(&output.stdout).expect("error record");
    assert!(
        record["error"]
            .as_str()
            .is_some_and(|e| e.contains("not found")),
        "record: {record}"
    );
}

#[test]
fn missing_arguments_exit_nonzero() {
    let output = Command::new(env!("CARGO_BIN_EXE_gomoku_judge"))
        .arg("interactive")
        .output()
        .expect("run judge");
    assert!(!output.status.success());
}
