//! Core domain types for the connection-five board.

use serde::{Deserialize, Serialize};

/// Board side length. The classic connection-five board is 15x15.
pub const BOARD_SIZE: usize = 15;

/// Stone symbol identifying one side of the match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Symbol {
    /// O moves first.
    O,
    /// X moves second.
    X,
}

impl Symbol {
    /// Returns the opposing symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::O => Symbol::X,
            Symbol::X => Symbol::O,
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// No stone placed yet.
    Empty,
    /// Cell occupied by a stone.
    Occupied(Symbol),
}

/// A validated, applied placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Row coordinate, 0-based.
    pub x: usize,
    /// Column coordinate, 0-based.
    pub y: usize,
    /// Which side placed the stone.
    pub symbol: Symbol,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_flips() {
        assert_eq!(Symbol::O.opponent(), Symbol::X);
        assert_eq!(Symbol::X.opponent(), Symbol::O);
    }

    #[test]
    fn symbol_string_round_trip() {
        assert_eq!(Symbol::O.to_string(), "O");
        assert_eq!("X".parse::<Symbol>().unwrap(), Symbol::X);
        assert!("Z".parse::<Symbol>().is_err());
    }
}
