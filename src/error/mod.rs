//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`Result`]. Verification
//! outcomes that are not errors (a signature that does not check out) are
//! plain booleans at the transaction level and only become
//! [`BlockchainError::InvalidSignature`] when a caller asks the account book
//! to accept the transaction.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// The block store could not read or write
    Database(String),
    /// A persisted chain failed to decode or its back-links are broken
    MalformedChainData(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Key handling and signing errors
    Crypto(String),
    /// Transaction construction errors
    Transaction(String),
    /// An input references a transaction that is not on the chain
    UnknownPriorTransaction(String),
    /// A transaction failed signature verification
    InvalidSignature(String),
    /// Wallet lookup and wallet file errors
    Wallet(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Spendable total is below the requested amount
    InsufficientFunds { required: u64, available: u64 },
    /// Block construction errors
    InvalidBlock(String),
    /// Compact difficulty bits that do not describe a 256-bit target
    InvalidTarget(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::MalformedChainData(msg) => write!(f, "Malformed chain data: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::UnknownPriorTransaction(txid) => {
                write!(f, "Unknown prior transaction: {txid}")
            }
            BlockchainError::InvalidSignature(txid) => {
                write!(f, "Signature verification failed for transaction {txid}")
            }
            BlockchainError::Wallet(msg) => write!(f, "Wallet error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::InvalidTarget(msg) => write!(f, "Invalid target: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}
