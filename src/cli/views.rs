// Printable forms of ledger data: hex digests and addresses instead of raw
// bytes.

use crate::core::{Block, Transaction};
use crate::wallet::{convert_address, hash_pub_key};
use data_encoding::HEXLOWER;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct BlockView {
    pub height: usize,
    pub hash: String,
    pub previous_hash: String,
    pub merkle_root: String,
    pub version: u32,
    pub timestamp: u32,
    pub bits: String,
    pub nonce: u32,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub txid: String,
    pub coinbase: bool,
    pub inputs: Vec<InputView>,
    pub outputs: Vec<OutputView>,
}

#[derive(Debug, Serialize)]
pub struct InputView {
    pub txid: String,
    pub vout: i32,
    /// Spending address, or the reward note on a coinbase
    pub from: String,
}

#[derive(Debug, Serialize)]
pub struct OutputView {
    pub value: u64,
    pub to: String,
}

impl BlockView {
    pub fn new(height: usize, block: &Block) -> BlockView {
        BlockView {
            height,
            hash: HEXLOWER.encode(&block.hash()),
            previous_hash: HEXLOWER.encode(block.get_previous_hash()),
            merkle_root: HEXLOWER.encode(block.get_merkle_root()),
            version: block.get_version(),
            timestamp: block.get_timestamp(),
            bits: HEXLOWER.encode(&block.get_bits()),
            nonce: block.get_nonce(),
            transactions: block
                .get_transactions()
                .iter()
                .map(TransactionView::new)
                .collect(),
        }
    }
}

impl TransactionView {
    pub fn new(tx: &Transaction) -> TransactionView {
        let coinbase = tx.is_coinbase();
        let inputs = tx
            .get_vin()
            .iter()
            .map(|input| InputView {
                txid: HEXLOWER.encode(input.get_txid()),
                vout: input.get_vout(),
                from: if coinbase {
                    String::from_utf8_lossy(input.get_pub_key()).into_owned()
                } else {
                    convert_address(&hash_pub_key(input.get_pub_key()))
                },
            })
            .collect();
        let outputs = tx
            .get_vout()
            .iter()
            .map(|output| OutputView {
                value: output.get_value(),
                to: convert_address(output.get_pub_key_hash()),
            })
            .collect();
        TransactionView {
            txid: HEXLOWER.encode(tx.get_id()),
            coinbase,
            inputs,
            outputs,
        }
    }
}

impl fmt::Display for BlockView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Pre block hash: {}", self.previous_hash)?;
        writeln!(f, "Cur block hash: {}", self.hash)?;
        writeln!(f, "Merkle root: {}", self.merkle_root)?;
        writeln!(
            f,
            "Timestamp: {}  Bits: {}  Nonce: {}",
            self.timestamp, self.bits, self.nonce
        )?;
        for tx in &self.transactions {
            write!(f, "{tx}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TransactionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Transaction txid_hex: {}", self.txid)?;
        for input in &self.inputs {
            if self.coinbase {
                writeln!(f, "-- Reward note: {}", input.from)?;
            } else {
                writeln!(
                    f,
                    "-- Input txid = {}, vout = {}, from = {}",
                    input.txid, input.vout, input.from
                )?;
            }
        }
        for output in &self.outputs {
            writeln!(f, "-- Output value = {}, to = {}", output.value, output.to)?;
        }
        Ok(())
    }
}
