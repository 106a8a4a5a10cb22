//! Helpers shared by the unit tests

use crate::core::{Block, Blockchain, Hash, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::{MemoryStore, SledStore, TxPool};
use crate::wallet::{Wallet, Wallets};
use tempfile::TempDir;

/// Target near 2^255: about every other header qualifies
pub const EASY_BITS: [u8; 4] = [0x20, 0x7f, 0xff, 0xff];

pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| BlockchainError::Io(e.to_string()))
}

/// A coinbase paying a throwaway wallet
pub fn coinbase_for_new_wallet() -> Transaction {
    let address = Wallet::new().expect("wallet").get_address();
    Transaction::new_coinbase_tx(&address, "").expect("coinbase")
}

/// A sealed block on `previous_hash` holding `tx_count` coinbases.
pub fn easy_block(previous_hash: Hash, tx_count: usize) -> Block {
    let address = Wallet::new().expect("wallet").get_address();
    let transactions = (0..tx_count)
        .map(|i| Transaction::new_coinbase_tx(&address, &format!("tx {i}")).expect("coinbase"))
        .collect();
    Block::mine_block(previous_hash, transactions, EASY_BITS).expect("mined block")
}

/// Genesis-only ledger over a [`MemoryStore`]
pub fn memory_chain() -> Blockchain {
    Blockchain::open(Box::new(MemoryStore::new()), EASY_BITS).expect("memory chain")
}

/// Genesis-only ledger on disk; keep the directory alive with the chain.
pub fn sled_chain() -> Result<(Blockchain, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let store = SledStore::open(temp_dir.path().join("blocks"))?;
    let blockchain = Blockchain::open(Box::new(store), EASY_BITS)?;
    Ok((blockchain, temp_dir))
}

/// In-memory ledger where a fresh wallet holds one reward output.
pub fn funded_chain() -> (Blockchain, Wallet) {
    let mut chain = memory_chain();
    let wallet = Wallet::new().expect("wallet");
    let reward = Transaction::new_coinbase_tx(&wallet.get_address(), "funding").expect("coinbase");
    mine_pending(&mut chain, vec![reward]);
    (chain, wallet)
}

/// Pools `transactions` and seals them into the next block without a reward.
pub fn mine_pending(chain: &mut Blockchain, transactions: Vec<Transaction>) -> Block {
    let mut pool = TxPool::new();
    for tx in transactions {
        pool.add(tx);
    }
    chain
        .add_block(&mut pool, "")
        .expect("add block")
        .expect("non-empty pool")
}

pub fn create_test_wallets(count: usize) -> Result<(Wallets, Vec<String>, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let mut wallets = Wallets::load(temp_dir.path().join("wallet.dat"))?;
    let mut addresses = Vec::new();

    for _ in 0..count {
        addresses.push(wallets.create_wallet()?);
    }

    Ok((wallets, addresses, temp_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProofOfWork;

    #[test]
    fn test_sled_chain_starts_at_genesis() {
        let (blockchain, _temp_dir) = sled_chain().unwrap();
        assert_eq!(blockchain.height(), 0);
        blockchain.validate().unwrap();
    }

    #[test]
    fn test_create_test_wallets() {
        let (wallets, addresses, _temp_dir) = create_test_wallets(5).unwrap();
        assert_eq!(addresses.len(), 5);

        // All addresses should be unique
        for i in 0..addresses.len() {
            for j in i + 1..addresses.len() {
                assert_ne!(addresses[i], addresses[j]);
            }
        }
        assert!(addresses.iter().all(|a| wallets.get_wallet(a).is_some()));
    }

    #[test]
    fn test_funded_chain() {
        let (chain, _wallet) = funded_chain();
        assert_eq!(chain.height(), 1);
        assert!(ProofOfWork::validate(&chain.blocks()[1]));
        chain.validate().unwrap();
    }
}
