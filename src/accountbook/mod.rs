//! Account book
//!
//! A thread-safe front for one ledger and its pending pool: balances,
//! transfers, rewards, block production and lookups.

pub mod account_book;

pub use account_book::AccountBook;
