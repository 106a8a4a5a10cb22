//! Command-line interface
//!
//! Argument parsing and printable views of ledger data.

pub mod commands;
pub mod views;

pub use commands::{Command, Opt};
pub use views::{BlockView, TransactionView};
