use crate::core::{Block, Blockchain, Hash, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::{BlockStore, SledStore, TxPool, UTXOOutput, UTXOSet};
use crate::wallet::{key_hash_from_address, Wallet};
use data_encoding::HEXLOWER;
use log::{error, info};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

struct LedgerState {
    chain: Blockchain,
    pool: TxPool,
}

/// One ledger plus its pool behind a single lock, so submitting, draining
/// and appending never interleave.
pub struct AccountBook {
    state: Mutex<LedgerState>,
}

impl AccountBook {
    pub fn new(chain: Blockchain) -> AccountBook {
        AccountBook {
            state: Mutex::new(LedgerState {
                chain,
                pool: TxPool::new(),
            }),
        }
    }

    pub fn open(store: Box<dyn BlockStore>, bits: [u8; 4]) -> Result<AccountBook> {
        Ok(Self::new(Blockchain::open(store, bits)?))
    }

    /// Opens (or creates) a sled-backed ledger under `path`.
    pub fn open_path(path: impl AsRef<Path>, bits: [u8; 4]) -> Result<AccountBook> {
        Self::open(Box::new(SledStore::open(path)?), bits)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| {
            error!("Account book lock poisoned");
            BlockchainError::Database("Account book lock poisoned".to_string())
        })
    }

    pub fn balance(&self, address: &str) -> Result<u64> {
        let key_hash = key_hash_from_address(address)?;
        let state = self.lock()?;
        Ok(UTXOSet::new(&state.chain).get_balance(&key_hash))
    }

    pub fn list_utxo(&self, address: &str) -> Result<Vec<UTXOOutput>> {
        let key_hash = key_hash_from_address(address)?;
        let state = self.lock()?;
        Ok(UTXOSet::new(&state.chain).find_utxo(&key_hash))
    }

    /// Builds and signs a transfer without pooling it.
    pub fn create_transaction(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        wallet: &Wallet,
    ) -> Result<Transaction> {
        let state = self.lock()?;
        UTXOSet::new(&state.chain).create_transaction(from, to, amount, wallet)
    }

    /// Builds a transfer and pools it in one step.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        wallet: &Wallet,
    ) -> Result<Transaction> {
        let mut state = self.lock()?;
        let tx = UTXOSet::new(&state.chain).create_transaction(from, to, amount, wallet)?;
        Self::check_pending(&state, &tx)?;
        state.pool.add(tx.clone());
        info!(
            "Queued transfer {} of {amount} from {from} to {to}",
            HEXLOWER.encode(tx.get_id())
        );
        Ok(tx)
    }

    /// Verifies `tx` against the ledger and queues it for the next block.
    /// Returns `false` if it was already pending.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<bool> {
        let mut state = self.lock()?;
        Self::check_pending(&state, &tx)?;
        Ok(state.pool.add(tx))
    }

    // Signature, then duplicate ids, then spent-ness on chain and in the pool
    fn check_pending(state: &LedgerState, tx: &Transaction) -> Result<()> {
        let txid_hex = HEXLOWER.encode(tx.get_id());
        if !tx.verify(&state.chain) {
            return Err(BlockchainError::InvalidSignature(txid_hex));
        }
        if state.chain.find_transaction(tx.get_id()).is_some() {
            return Err(BlockchainError::Transaction(format!(
                "Transaction {txid_hex} is already on the ledger"
            )));
        }
        if tx.is_coinbase() {
            // coinbase ids only differ by address and note
            if state.pool.contains(tx.get_id()) {
                return Err(BlockchainError::Transaction(format!(
                    "Reward {txid_hex} is already pending"
                )));
            }
            return Ok(());
        }

        let utxo_set = UTXOSet::new(&state.chain);
        for vin in tx.get_vin() {
            if utxo_set.is_spent(vin.get_txid(), vin.get_vout())
                || state.pool.spends(vin.get_txid(), vin.get_vout())
            {
                return Err(BlockchainError::Transaction(format!(
                    "Transaction {txid_hex} spends {}:{} twice",
                    HEXLOWER.encode(vin.get_txid()),
                    vin.get_vout()
                )));
            }
        }
        Ok(())
    }

    /// Queues a coinbase paying `to`; mined with the next block.
    ///
    /// An empty `note` is replaced by one naming the target height and pool
    /// slot. A reward whose id is already on the ledger or pending is refused.
    pub fn reward(&self, to: &str, note: &str) -> Result<Transaction> {
        let mut state = self.lock()?;
        let note = if note.is_empty() {
            format!(
                "Queued reward to '{to}' for height {} slot {}",
                state.chain.height() + 1,
                state.pool.len()
            )
        } else {
            note.to_string()
        };
        let tx = Transaction::new_coinbase_tx(to, &note)?;
        Self::check_pending(&state, &tx)?;
        state.pool.add(tx.clone());
        info!("Queued reward {} to {to}", HEXLOWER.encode(tx.get_id()));
        Ok(tx)
    }

    /// Seals the pending pool into a block, paying `miner_address` if it is
    /// non-empty. `Ok(None)` when nothing is pending.
    pub fn mine(&self, miner_address: &str) -> Result<Option<Block>> {
        let mut state = self.lock()?;
        let LedgerState { chain, pool } = &mut *state;
        chain.add_block(pool, miner_address)
    }

    /// Checks and pools `transactions`, then mines them. Nothing is pooled
    /// unless every transaction passes.
    pub fn add_block(
        &self,
        transactions: Vec<Transaction>,
        miner_address: &str,
    ) -> Result<Option<Block>> {
        let mut state = self.lock()?;
        let mut batch = TxPool::new();
        for tx in transactions {
            Self::check_pending(&state, &tx)?;
            // every coinbase input is the same placeholder, so only ids count
            let conflicts = if tx.is_coinbase() {
                batch.contains(tx.get_id())
            } else {
                tx.get_vin()
                    .iter()
                    .any(|vin| batch.spends(vin.get_txid(), vin.get_vout()))
            };
            if conflicts {
                return Err(BlockchainError::Transaction(format!(
                    "Transaction {} conflicts with another in the same block",
                    HEXLOWER.encode(tx.get_id())
                )));
            }
            batch.add(tx);
        }

        let LedgerState { chain, pool } = &mut *state;
        for tx in batch.drain() {
            pool.add(tx);
        }
        chain.add_block(pool, miner_address)
    }

    pub fn find_transaction(&self, txid: &[u8]) -> Result<Option<Transaction>> {
        Ok(self.lock()?.chain.find_transaction(txid))
    }

    pub fn verify_transaction(&self, tx: &Transaction) -> Result<bool> {
        Ok(tx.verify(&self.lock()?.chain))
    }

    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.lock()?.pool.len())
    }

    /// Snapshot of the pool in arrival order.
    pub fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.lock()?.pool.get_all().to_vec())
    }

    pub fn height(&self) -> Result<usize> {
        Ok(self.lock()?.chain.height())
    }

    pub fn tip_hash(&self) -> Result<Hash> {
        Ok(self.lock()?.chain.tip_hash())
    }

    pub fn blocks(&self) -> Result<Vec<Block>> {
        Ok(self.lock()?.chain.blocks().to_vec())
    }

    pub fn validate(&self) -> Result<()> {
        self.lock()?.chain.validate()
    }
}
