//! # Account Book
//!
//! A small UTXO ledger: signed transactions, Merkle-committed blocks sealed
//! with proof-of-work, and a sled-backed chain store.
//!
//! ## Layout
//! - `core/`: transactions, Merkle trees, blocks, proof-of-work, the chain
//! - `storage/`: block stores, the pending pool, unspent-output queries
//! - `accountbook/`: the locked facade most callers want
//! - `wallet/`: key pairs, key hashes and Base58Check addresses
//! - `config/`: environment-driven settings
//! - `utils/`: hashing, signatures and bincode helpers
//! - `cli/`: argument parsing and printable views
//!
//! Every balance query rescans the chain; there is no separate index to
//! drift out of sync.

pub mod accountbook;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

pub use accountbook::AccountBook;
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{
    compact_to_target, Block, Blockchain, Hash, MerkleProof, MerkleTree, ProofOfWork, TXInput,
    TXOutput, Transaction, TransactionResolver, DEFAULT_BITS, SUBSIDY, ZERO_HASH,
};
pub use error::{BlockchainError, Result};
pub use storage::{BlockStore, MemoryStore, SledStore, TxPool, UTXOOutput, UTXOSet};
pub use utils::{
    base58_decode, base58_encode, ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify,
    new_key_pair, ripemd160_digest, sha256_digest, sha256_hash,
};
pub use wallet::{
    convert_address, hash_pub_key, key_hash_from_address, validate_address, Wallet, Wallets,
    ADDRESS_CHECK_SUM_LEN,
};
