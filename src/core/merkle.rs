use crate::core::{Hash, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_hash;
use serde::{Deserialize, Serialize};

/// Merkle tree over a block's transactions.
///
/// Built bottom-up one level at a time: `levels[0]` holds the leaf hashes and
/// the last level holds only the root. Adjacent nodes are paired left to
/// right and hashed as `sha256(left ‖ right)`; an odd trailing node is hashed
/// alone as `sha256(node)` rather than paired with a copy of itself.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

/// One step from a node towards the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofElement {
    /// Sibling sits to the left: parent = H(sibling ‖ current)
    Left(Hash),
    /// Sibling sits to the right: parent = H(current ‖ sibling)
    Right(Hash),
    /// Odd trailing node: parent = H(current)
    Lone,
}

/// Merkle proof for transaction inclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_hash: Hash,
    pub merkle_root: Hash,
    pub proof_path: Vec<ProofElement>,
    pub transaction_index: usize,
}

impl MerkleTree {
    pub fn new(transactions: &[Transaction]) -> Result<Self> {
        let leaves = transactions
            .iter()
            .map(Self::leaf_hash)
            .collect::<Result<Vec<Hash>>>()?;
        Self::from_leaf_hashes(leaves)
    }

    pub fn from_leaf_hashes(leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(BlockchainError::InvalidBlock(
                "Cannot create Merkle tree from empty transaction list".to_string(),
            ));
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let parents = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => Self::hash_pair(left, right),
                    _ => Self::hash_lone(&pair[0]),
                })
                .collect();
            levels.push(parents);
        }

        Ok(MerkleTree { levels })
    }

    /// Leaf hash: SHA-256 over the transaction's full serialization.
    pub fn leaf_hash(transaction: &Transaction) -> Result<Hash> {
        Ok(sha256_hash(&transaction.serialize()?))
    }

    pub fn calculate_merkle_root(transactions: &[Transaction]) -> Result<Hash> {
        Ok(Self::new(transactions)?.root())
    }

    pub fn verify_transactions(transactions: &[Transaction], expected_root: &Hash) -> Result<bool> {
        Ok(&Self::calculate_merkle_root(transactions)? == expected_root)
    }

    pub fn root(&self) -> Hash {
        // from_leaf_hashes guarantees a final level with exactly one node
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels including leaves and root
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn generate_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        if transaction_index >= self.leaf_count() {
            return Err(BlockchainError::InvalidBlock(format!(
                "Transaction index {} out of bounds (max: {})",
                transaction_index,
                self.leaf_count() - 1
            )));
        }

        let mut proof_path = Vec::with_capacity(self.depth() - 1);
        let mut index = transaction_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let element = if index % 2 == 1 {
                ProofElement::Left(level[index - 1])
            } else if let Some(sibling) = level.get(index + 1) {
                ProofElement::Right(*sibling)
            } else {
                ProofElement::Lone
            };
            proof_path.push(element);
            index /= 2;
        }

        Ok(MerkleProof {
            leaf_hash: self.levels[0][transaction_index],
            merkle_root: self.root(),
            proof_path,
            transaction_index,
        })
    }

    pub fn verify_proof(proof: &MerkleProof) -> bool {
        let computed = proof
            .proof_path
            .iter()
            .fold(proof.leaf_hash, |current, element| match element {
                ProofElement::Left(sibling) => Self::hash_pair(sibling, &current),
                ProofElement::Right(sibling) => Self::hash_pair(&current, sibling),
                ProofElement::Lone => Self::hash_lone(&current),
            });
        computed == proof.merkle_root
    }

    fn hash_pair(left: &Hash, right: &Hash) -> Hash {
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(left);
        combined[32..].copy_from_slice(right);
        sha256_hash(&combined)
    }

    fn hash_lone(node: &Hash) -> Hash {
        sha256_hash(node)
    }
}
