//! Wallet management
//!
//! Key generation, HASH160 key hashes and Base58Check addresses. The ledger
//! core only consumes key hashes and raw public keys from here.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{
    convert_address, hash_pub_key, key_hash_from_address, validate_address, Wallet,
    ADDRESS_CHECK_SUM_LEN, KEY_HASH_LEN,
};
pub use wallets::{Wallets, WALLET_FILE};
