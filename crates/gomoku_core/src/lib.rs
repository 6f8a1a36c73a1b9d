//! Pure connection-five (gomoku) board logic.
//!
//! This crate holds the board grid, the single move-placement path, and the
//! five-in-a-row scan. It performs no I/O and knows nothing about processes
//! or protocols; the judge application layers those on top.

#![warn(missing_docs)]

mod board;
mod types;
mod win;

pub use board::{Board, PlaceError};
pub use types::{BOARD_SIZE, Cell, Move, Symbol};
pub use win::check_win;
