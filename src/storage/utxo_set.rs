use crate::core::{Blockchain, TXInput, TXOutput, Transaction};
use crate::error::{BlockchainError, Result};
use crate::wallet::{hash_pub_key, key_hash_from_address, Wallet};
use data_encoding::HEXLOWER;
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

/// An unspent output, located by transaction id and output index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UTXOOutput {
    pub txid: Vec<u8>,
    pub vout: i32,
    pub value: u64,
}

/// Unspent-output queries over a ledger. Every call rescans the whole chain.
pub struct UTXOSet<'a> {
    blockchain: &'a Blockchain,
}

impl<'a> UTXOSet<'a> {
    pub fn new(blockchain: &'a Blockchain) -> UTXOSet<'a> {
        UTXOSet { blockchain }
    }

    /// Outputs paying `pub_key_hash` that no input signed by the same key
    /// has consumed, in chain order.
    pub fn find_utxo(&self, pub_key_hash: &[u8]) -> Vec<UTXOOutput> {
        let blocks = self.blockchain.blocks();

        // ( txid, vout ) pairs already spent by this key
        let mut spent: HashSet<(&[u8], i32)> = HashSet::new();
        for tx in blocks.iter().flat_map(|block| block.get_transactions()) {
            if tx.is_coinbase() {
                continue;
            }
            for vin in tx.get_vin() {
                if vin.uses_key(pub_key_hash) {
                    spent.insert((vin.get_txid(), vin.get_vout()));
                }
            }
        }

        let mut utxos = vec![];
        for tx in blocks.iter().flat_map(|block| block.get_transactions()) {
            for (idx, out) in tx.get_vout().iter().enumerate() {
                let Ok(vout) = i32::try_from(idx) else {
                    break;
                };
                if out.is_locked_with_key(pub_key_hash) && !spent.contains(&(tx.get_id(), vout)) {
                    utxos.push(UTXOOutput {
                        txid: tx.get_id().to_vec(),
                        vout,
                        value: out.get_value(),
                    });
                }
            }
        }
        utxos
    }

    /// Whether any input on the chain already consumes `txid:vout`.
    pub fn is_spent(&self, txid: &[u8], vout: i32) -> bool {
        self.blockchain
            .blocks()
            .iter()
            .flat_map(|block| block.get_transactions())
            .filter(|tx| !tx.is_coinbase())
            .flat_map(|tx| tx.get_vin())
            .any(|vin| vin.get_txid() == txid && vin.get_vout() == vout)
    }

    /// Takes unspent outputs in chain order until they cover `amount`.
    /// The total may fall short when the key cannot afford it.
    pub fn find_spendable_outputs(
        &self,
        pub_key_hash: &[u8],
        amount: u64,
    ) -> (u64, Vec<UTXOOutput>) {
        let mut accumulated = 0u64;
        let mut selected = vec![];
        for utxo in self.find_utxo(pub_key_hash) {
            if accumulated >= amount {
                break;
            }
            accumulated = accumulated.saturating_add(utxo.value);
            selected.push(utxo);
        }
        (accumulated, selected)
    }

    pub fn get_balance(&self, pub_key_hash: &[u8]) -> u64 {
        self.find_utxo(pub_key_hash)
            .iter()
            .fold(0u64, |total, utxo| total.saturating_add(utxo.value))
    }

    /// Builds and signs a transfer of `amount` from `from` to `to`, returning
    /// change to `from`. Nothing is pooled or persisted here.
    pub fn create_transaction(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        wallet: &Wallet,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Transaction(
                "Transfer amount must be positive".to_string(),
            ));
        }

        let from_hash = key_hash_from_address(from)?;
        if hash_pub_key(wallet.get_public_key()) != from_hash {
            return Err(BlockchainError::Wallet(format!(
                "Wallet does not hold the key for {from}"
            )));
        }
        let payment = TXOutput::new(amount, to)?;

        let (accumulated, selected) = self.find_spendable_outputs(&from_hash, amount);
        if accumulated < amount {
            return Err(BlockchainError::InsufficientFunds {
                required: amount,
                available: accumulated,
            });
        }

        let inputs = selected
            .iter()
            .map(|utxo| TXInput::new(&utxo.txid, utxo.vout, wallet.get_public_key()))
            .collect();
        let mut outputs = vec![payment];
        if accumulated > amount {
            outputs.push(TXOutput::with_key_hash(accumulated - amount, &from_hash));
        }

        let mut tx = Transaction::new(inputs, outputs)?;
        tx.sign(wallet.get_pkcs8(), self.blockchain)?;
        debug!(
            "Built transaction {} spending {} outputs worth {accumulated}",
            HEXLOWER.encode(tx.get_id()),
            selected.len()
        );
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SUBSIDY;
    use crate::storage::TxPool;
    use crate::testnet::{funded_chain, mine_pending};

    #[test]
    fn test_reward_is_spendable() {
        let (chain, alice) = funded_chain();
        let utxo_set = UTXOSet::new(&chain);
        let key_hash = hash_pub_key(alice.get_public_key());

        let utxos = utxo_set.find_utxo(&key_hash);
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].vout, 0);
        assert_eq!(utxos[0].value, SUBSIDY);
        assert_eq!(utxo_set.get_balance(&key_hash), SUBSIDY);
    }

    #[test]
    fn test_transfer_with_change() {
        let (mut chain, alice) = funded_chain();
        let bob = Wallet::new().unwrap();

        let tx = UTXOSet::new(&chain)
            .create_transaction(&alice.get_address(), &bob.get_address(), 40, &alice)
            .unwrap();
        assert_eq!(tx.get_vin().len(), 1);
        assert_eq!(tx.get_vout().len(), 2);
        assert!(tx.verify(&chain));

        mine_pending(&mut chain, vec![tx]);
        let utxo_set = UTXOSet::new(&chain);
        assert_eq!(utxo_set.get_balance(&hash_pub_key(alice.get_public_key())), 60);
        assert_eq!(utxo_set.get_balance(&hash_pub_key(bob.get_public_key())), 40);
    }

    #[test]
    fn test_exact_amount_has_no_change() {
        let (chain, alice) = funded_chain();
        let bob = Wallet::new().unwrap();
        let tx = UTXOSet::new(&chain)
            .create_transaction(&alice.get_address(), &bob.get_address(), SUBSIDY, &alice)
            .unwrap();
        assert_eq!(tx.get_vout().len(), 1);
    }

    #[test]
    fn test_insufficient_funds() {
        let (chain, alice) = funded_chain();
        let bob = Wallet::new().unwrap();
        let err = UTXOSet::new(&chain)
            .create_transaction(&alice.get_address(), &bob.get_address(), 150, &alice)
            .unwrap_err();
        assert_eq!(
            err,
            BlockchainError::InsufficientFunds {
                required: 150,
                available: SUBSIDY
            }
        );
    }

    #[test]
    fn test_rejects_zero_amount_and_foreign_wallet() {
        let (chain, alice) = funded_chain();
        let bob = Wallet::new().unwrap();
        let utxo_set = UTXOSet::new(&chain);

        assert!(matches!(
            utxo_set.create_transaction(&alice.get_address(), &bob.get_address(), 0, &alice),
            Err(BlockchainError::Transaction(_))
        ));
        assert!(matches!(
            utxo_set.create_transaction(&alice.get_address(), &bob.get_address(), 10, &bob),
            Err(BlockchainError::Wallet(_))
        ));
        assert!(matches!(
            utxo_set.create_transaction(&alice.get_address(), "not-an-address", 10, &alice),
            Err(BlockchainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_spent_outputs_leave_the_set() {
        let (mut chain, alice) = funded_chain();
        let bob = Wallet::new().unwrap();
        let alice_hash = hash_pub_key(alice.get_public_key());
        let reward_id = UTXOSet::new(&chain).find_utxo(&alice_hash)[0].txid.clone();

        let tx = UTXOSet::new(&chain)
            .create_transaction(&alice.get_address(), &bob.get_address(), 25, &alice)
            .unwrap();
        mine_pending(&mut chain, vec![tx]);

        let utxo_set = UTXOSet::new(&chain);
        assert!(utxo_set.is_spent(&reward_id, 0));
        assert!(!utxo_set.is_spent(&reward_id, 1));

        let remaining = utxo_set.find_utxo(&alice_hash);
        assert!(remaining.iter().all(|utxo| utxo.txid != reward_id));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].value, 75);
    }

    #[test]
    fn test_selection_stops_once_covered() {
        let (mut chain, alice) = funded_chain();
        let mut pool = TxPool::new();
        pool.add(Transaction::new_coinbase_tx(&alice.get_address(), "second").unwrap());
        chain.add_block(&mut pool, "").unwrap();

        let key_hash = hash_pub_key(alice.get_public_key());
        let (total, selected) = UTXOSet::new(&chain).find_spendable_outputs(&key_hash, 50);
        assert_eq!(total, SUBSIDY);
        assert_eq!(selected.len(), 1);

        let (total, selected) = UTXOSet::new(&chain).find_spendable_outputs(&key_hash, 150);
        assert_eq!(total, 2 * SUBSIDY);
        assert_eq!(selected.len(), 2);
    }
}
