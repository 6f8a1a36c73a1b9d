//! Command-line interface for the judge.

use clap::{Parser, Subcommand};
use gomoku_core::Symbol;
use std::path::PathBuf;

/// Gomoku Judge - Connection-five referee for external bot processes
#[derive(Parser, Debug)]
#[command(name = "gomoku_judge")]
#[command(about = "Connection-five referee for external players and bot processes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Optional judge configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Referee one bot against an external player driven over stdin/stdout
    Interactive {
        /// Path to the bot executable
        bot: PathBuf,

        /// Symbol the external player uses (the bot gets the other one)
        symbol: Symbol,
    },

    /// Referee two bot processes against each other
    Duel {
        /// First bot executable
        first: PathBuf,

        /// Second bot executable
        second: PathBuf,

        /// Symbol assigned to the first bot (O moves first)
        first_symbol: Symbol,
    },
}
