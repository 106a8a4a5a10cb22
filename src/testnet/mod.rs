//! Test fixtures
//!
//! Easy-difficulty ledgers, funded wallets and throwaway directories for the
//! unit tests.

pub mod test_utils;

pub use test_utils::*;
