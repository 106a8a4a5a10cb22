//! Ledger core
//!
//! Transactions and their signing protocol, Merkle roots, block headers,
//! proof-of-work sealing and the append-only chain of blocks.

pub mod block;
pub mod blockchain;
pub mod merkle;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, Hash, BLOCK_VERSION, DEFAULT_BITS, HEADER_LEN, ZERO_HASH};
pub use blockchain::{Blockchain, BlockchainIterator};
pub use merkle::{MerkleProof, MerkleTree, ProofElement};
pub use proof_of_work::{compact_to_target, ProofOfWork};
pub use transaction::{TXInput, TXOutput, Transaction, TransactionResolver, COINBASE_VOUT, SUBSIDY};
