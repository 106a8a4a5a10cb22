//! Persistence and pending state
//!
//! Block stores (sled-backed and in-memory), the pending transaction pool
//! and unspent-output queries over a loaded ledger.

pub mod block_store;
pub mod sled_store;
pub mod tx_pool;
pub mod utxo_set;

pub use block_store::{BlockStore, MemoryStore};
pub use sled_store::SledStore;
pub use tx_pool::TxPool;
pub use utxo_set::{UTXOOutput, UTXOSet};
