// Transactions move value by consuming earlier outputs and creating new ones.
// The id is fixed before any signature is attached, and every input signs
// the same construction: the referenced output's key hash followed by the
// spending transaction's id.

use crate::error::{BlockchainError, Result};
use crate::utils::{
    deserialize, ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, serialize,
    sha256_digest,
};
use crate::wallet::{hash_pub_key, key_hash_from_address};
use data_encoding::HEXLOWER;
use log::warn;
use serde::{Deserialize, Serialize};

/// Reward paid by every coinbase transaction
pub const SUBSIDY: u64 = 100;

/// Output index carried by the single coinbase input
pub const COINBASE_VOUT: i32 = -1;

/// Looks up a transaction already on the ledger by id.
///
/// Signing and verification only ever read earlier transactions through this
/// trait, so they work against a [`crate::core::Blockchain`] or any closure.
pub trait TransactionResolver {
    fn resolve_transaction(&self, txid: &[u8]) -> Option<Transaction>;
}

impl<F> TransactionResolver for F
where
    F: Fn(&[u8]) -> Option<Transaction>,
{
    fn resolve_transaction(&self, txid: &[u8]) -> Option<Transaction> {
        self(txid)
    }
}

// A reference to output #vout of transaction txid, plus the proof of ownership
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TXInput {
    txid: Vec<u8>,
    vout: i32,
    signature: Vec<u8>, // raw r ‖ s, empty until signed
    pub_key: Vec<u8>,   // raw X ‖ Y, or the miner note on a coinbase
}

impl TXInput {
    /// An unsigned input spending `txid:vout` with `pub_key`.
    pub fn new(txid: &[u8], vout: i32, pub_key: &[u8]) -> TXInput {
        TXInput {
            txid: txid.to_vec(),
            vout,
            signature: vec![],
            pub_key: pub_key.to_vec(),
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_vout(&self) -> i32 {
        self.vout
    }

    pub fn get_signature(&self) -> &[u8] {
        self.signature.as_slice()
    }

    pub fn get_pub_key(&self) -> &[u8] {
        self.pub_key.as_slice()
    }

    /// Whether this input's public key hashes to `pub_key_hash`.
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        hash_pub_key(self.pub_key.as_slice()).eq(pub_key_hash)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,
    pub_key_hash: Vec<u8>,
}

impl TXOutput {
    /// An output paying `value` to the key hash behind `address`.
    pub fn new(value: u64, address: &str) -> Result<TXOutput> {
        Ok(TXOutput {
            value,
            pub_key_hash: key_hash_from_address(address)?,
        })
    }

    pub fn with_key_hash(value: u64, pub_key_hash: &[u8]) -> TXOutput {
        TXOutput {
            value,
            pub_key_hash: pub_key_hash.to_vec(),
        }
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash.eq(pub_key_hash)
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
}

impl Transaction {
    /// Builds a transaction and fixes its id. Inputs are expected unsigned.
    pub fn new(vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Result<Transaction> {
        let mut tx = Transaction {
            id: vec![],
            vin,
            vout,
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    /// The block reward: no real input, one [`SUBSIDY`] output to `to`.
    ///
    /// An empty `note` becomes `Reward to '<to>'`; the note rides in the
    /// input's public-key slot.
    pub fn new_coinbase_tx(to: &str, note: &str) -> Result<Transaction> {
        let note = if note.is_empty() {
            format!("Reward to '{to}'")
        } else {
            note.to_string()
        };
        let txout = TXOutput::new(SUBSIDY, to)?;
        let txin = TXInput::new(&[], COINBASE_VOUT, note.as_bytes());
        Self::new(vec![txin], vec![txout])
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].txid.is_empty() && self.vin[0].vout == COINBASE_VOUT
    }

    /// SHA-256 of the transaction serialized with `id` cleared. Signatures are
    /// hashed in whatever state they hold, which in normal flow is empty.
    pub fn hash(&self) -> Result<Vec<u8>> {
        let tx_copy = Transaction {
            id: vec![],
            vin: self.vin.clone(),
            vout: self.vout.clone(),
        };
        Ok(sha256_digest(&tx_copy.serialize()?))
    }

    // The id recomputed as it was before signing
    fn unsigned_hash(&self) -> Result<Vec<u8>> {
        let mut tx_copy = self.clone();
        for input in &mut tx_copy.vin {
            input.signature.clear();
        }
        tx_copy.hash()
    }

    fn signing_message(prev_output: &TXOutput, txid: &[u8]) -> Vec<u8> {
        let mut message = prev_output.pub_key_hash.clone();
        message.extend_from_slice(txid);
        message
    }

    /// Output `vout`, or `None` for a negative or out-of-range index.
    pub fn output_at(&self, vout: i32) -> Option<&TXOutput> {
        usize::try_from(vout).ok().and_then(|idx| self.vout.get(idx))
    }

    fn referenced_output<R>(input: &TXInput, resolver: &R) -> Result<TXOutput>
    where
        R: TransactionResolver + ?Sized,
    {
        let prev_tx = resolver.resolve_transaction(input.get_txid()).ok_or_else(|| {
            BlockchainError::UnknownPriorTransaction(HEXLOWER.encode(input.get_txid()))
        })?;
        prev_tx.output_at(input.vout).cloned().ok_or_else(|| {
            BlockchainError::Transaction(format!(
                "Output index {} out of range for {}",
                input.vout,
                HEXLOWER.encode(input.get_txid())
            ))
        })
    }

    /// Signs every input with `pkcs8`. Coinbase transactions are left as is.
    pub fn sign<R>(&mut self, pkcs8: &[u8], resolver: &R) -> Result<()>
    where
        R: TransactionResolver + ?Sized,
    {
        if self.is_coinbase() {
            return Ok(());
        }

        for idx in 0..self.vin.len() {
            let prev_output = Self::referenced_output(&self.vin[idx], resolver)?;
            let message = Self::signing_message(&prev_output, &self.id);
            self.vin[idx].signature = ecdsa_p256_sha256_sign_digest(pkcs8, &message)?;
        }
        Ok(())
    }

    /// Checks every input signature against the outputs it spends.
    ///
    /// Coinbase transactions verify trivially. Anything unresolvable or
    /// malformed is a `false`, never an error.
    pub fn verify<R>(&self, resolver: &R) -> bool
    where
        R: TransactionResolver + ?Sized,
    {
        if self.is_coinbase() {
            return true;
        }

        let txid_hex = HEXLOWER.encode(&self.id);
        if self.vin.is_empty() {
            warn!("Transaction {txid_hex} has no inputs");
            return false;
        }

        match self.unsigned_hash() {
            Ok(id) if id == self.id => {}
            _ => {
                warn!("Transaction {txid_hex} does not match its id");
                return false;
            }
        }

        for vin in &self.vin {
            let prev_output = match Self::referenced_output(vin, resolver) {
                Ok(output) => output,
                Err(e) => {
                    warn!("Cannot verify transaction {txid_hex}: {e}");
                    return false;
                }
            };

            if !vin.uses_key(prev_output.get_pub_key_hash()) {
                warn!("Transaction {txid_hex} spends an output locked to another key");
                return false;
            }

            let message = Self::signing_message(&prev_output, &self.id);
            if !ecdsa_p256_sha256_sign_verify(&vin.pub_key, &vin.signature, &message) {
                warn!("Signature check failed for transaction {txid_hex}");
                return false;
            }
        }
        true
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }
}
