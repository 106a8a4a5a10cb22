use crate::core::{MerkleProof, MerkleTree, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::{deserialize_exact, serialize, sha256_hash, unix_timestamp};
use log::info;
use serde::{Deserialize, Serialize};

/// A SHA-256 digest
pub type Hash = [u8; 32];

/// Previous-hash of the genesis block, and its Merkle root
pub const ZERO_HASH: Hash = [0u8; 32];

pub const BLOCK_VERSION: u32 = 2;

/// Compact difficulty every block is sealed against unless configured otherwise
pub const DEFAULT_BITS: [u8; 4] = [0x1f, 0x00, 0xff, 0xff];

/// Serialized header length: version, two hashes, timestamp, bits, nonce
pub const HEADER_LEN: usize = 4 + 32 + 32 + 4 + 4 + 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    version: u32,
    previous_hash: Hash,
    merkle_root: Hash,
    timestamp: u32,
    bits: [u8; 4],
    nonce: u32,
    transactions: Vec<Transaction>,
}

impl Block {
    /// An unsealed block on top of `previous_hash`, nonce 0.
    pub fn new_block(
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        bits: [u8; 4],
    ) -> Result<Block> {
        let merkle_root = MerkleTree::calculate_merkle_root(&transactions)?;
        Ok(Block {
            version: BLOCK_VERSION,
            previous_hash,
            merkle_root,
            timestamp: unix_timestamp(),
            bits,
            nonce: 0,
            transactions,
        })
    }

    /// Builds a block and seals it with proof-of-work.
    pub fn mine_block(
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        bits: [u8; 4],
    ) -> Result<Block> {
        let mut block = Self::new_block(previous_hash, transactions, bits)?;
        let pow = ProofOfWork::new(bits)?;
        info!(
            "Mining block with {} transactions on {}",
            block.transactions.len(),
            data_encoding::HEXLOWER.encode(&previous_hash)
        );
        pow.run(&mut block);
        Ok(block)
    }

    /// Genesis: zero previous hash, zero Merkle root, no transactions, not mined.
    pub fn generate_genesis_block(bits: [u8; 4]) -> Block {
        Block {
            version: BLOCK_VERSION,
            previous_hash: ZERO_HASH,
            merkle_root: ZERO_HASH,
            timestamp: unix_timestamp(),
            bits,
            nonce: 0,
            transactions: vec![],
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash == ZERO_HASH
    }

    /// Big-endian header encoding that the block hash commits to.
    pub fn header_bytes(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&self.version.to_be_bytes());
        header[4..36].copy_from_slice(&self.previous_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.timestamp.to_be_bytes());
        header[72..76].copy_from_slice(&self.bits);
        header[76..80].copy_from_slice(&self.nonce.to_be_bytes());
        header
    }

    /// Identity hash over the header only; transactions count through the Merkle root.
    pub fn hash(&self) -> Hash {
        sha256_hash(&self.header_bytes())
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize_exact::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn get_previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn get_merkle_root(&self) -> &Hash {
        &self.merkle_root
    }

    pub fn get_timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn get_bits(&self) -> [u8; 4] {
        self.bits
    }

    pub fn get_nonce(&self) -> u32 {
        self.nonce
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    // Only the proof-of-work loop moves these
    pub(crate) fn next_attempt(&mut self, timestamp: u32) {
        self.nonce = self.nonce.wrapping_add(1);
        self.timestamp = timestamp;
    }

    /// Whether the stored Merkle root matches the transactions. Genesis has
    /// no transactions and a zero root.
    pub fn verify_merkle_root(&self) -> Result<bool> {
        if self.transactions.is_empty() {
            return Ok(self.merkle_root == ZERO_HASH);
        }
        MerkleTree::verify_transactions(&self.transactions, &self.merkle_root)
    }

    pub fn generate_merkle_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        if transaction_index >= self.transactions.len() {
            return Err(BlockchainError::InvalidBlock(format!(
                "Transaction index {} out of bounds for block with {} transactions",
                transaction_index,
                self.transactions.len()
            )));
        }
        MerkleTree::new(&self.transactions)?.generate_proof(transaction_index)
    }

    /// Verify a Merkle proof against this block's Merkle root
    pub fn verify_merkle_proof(&self, proof: &MerkleProof) -> bool {
        proof.merkle_root == self.merkle_root && MerkleTree::verify_proof(proof)
    }
}
