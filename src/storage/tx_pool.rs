use crate::core::Transaction;
use data_encoding::HEXLOWER;
use log::debug;
use std::collections::HashSet;

/// Pending transactions waiting for the next block, in arrival order.
///
/// A transaction id is accepted at most once until the pool is drained.
#[derive(Debug, Default)]
pub struct TxPool {
    transactions: Vec<Transaction>,
    ids: HashSet<Vec<u8>>,
}

impl TxPool {
    pub fn new() -> TxPool {
        Self::default()
    }

    /// Returns `false` and drops `tx` if its id is already pending.
    pub fn add(&mut self, tx: Transaction) -> bool {
        if !self.ids.insert(tx.get_id().to_vec()) {
            debug!("Transaction {} already pending", HEXLOWER.encode(tx.get_id()));
            return false;
        }
        debug!("Pooled transaction {}", HEXLOWER.encode(tx.get_id()));
        self.transactions.push(tx);
        true
    }

    pub fn contains(&self, txid: &[u8]) -> bool {
        self.ids.contains(txid)
    }

    /// Whether a pending transaction already consumes `txid:vout`.
    pub fn spends(&self, txid: &[u8], vout: i32) -> bool {
        self.transactions
            .iter()
            .flat_map(|tx| tx.get_vin())
            .any(|vin| vin.get_txid() == txid && vin.get_vout() == vout)
    }

    /// Empties the pool, handing back everything in arrival order.
    pub fn drain(&mut self) -> Vec<Transaction> {
        self.ids.clear();
        std::mem::take(&mut self.transactions)
    }

    pub fn get_all(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
