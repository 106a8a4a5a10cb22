use crate::core::{Block, Hash};
use crate::error::{BlockchainError, Result};
use data_encoding::HEXLOWER;
use std::collections::HashMap;
use std::sync::RwLock;

/// Durable home of sealed blocks, keyed by header hash, plus the pointer to
/// the newest one.
pub trait BlockStore: Send {
    fn put_block(&self, block: &Block) -> Result<()>;

    /// `Ok(None)` when no block is stored under `hash`. Bytes that do not
    /// decode are `MalformedChainData`.
    fn get_block(&self, hash: &Hash) -> Result<Option<Block>>;

    fn get_last_hash(&self) -> Result<Option<Hash>>;

    fn update_last_hash(&self, hash: &Hash) -> Result<()>;

    /// Stores `block` and moves the last-hash pointer onto it.
    fn commit_block(&self, block: &Block) -> Result<()> {
        self.put_block(block)?;
        self.update_last_hash(&block.hash())
    }
}

pub(crate) fn decode_stored_block(hash: &Hash, bytes: &[u8]) -> Result<Block> {
    Block::deserialize(bytes).map_err(|e| {
        BlockchainError::MalformedChainData(format!(
            "Block {} does not decode: {e}",
            HEXLOWER.encode(hash)
        ))
    })
}

pub(crate) fn decode_last_hash(bytes: &[u8]) -> Result<Hash> {
    Hash::try_from(bytes).map_err(|_| {
        BlockchainError::MalformedChainData(format!(
            "Last hash pointer has {} bytes, expected 32",
            bytes.len()
        ))
    })
}

/// Volatile store for tests and throwaway ledgers. Blocks are kept encoded so
/// a reload goes through the same decode path as a disk store.
#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<Hash, Vec<u8>>>,
    last_hash: RwLock<Option<Hash>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        Self::default()
    }

    /// Stores arbitrary bytes under `hash`, bypassing encoding.
    pub fn insert_raw(&self, hash: Hash, bytes: Vec<u8>) -> Result<()> {
        self.blocks
            .write()
            .map_err(|_| lock_poisoned("blocks"))?
            .insert(hash, bytes);
        Ok(())
    }

    pub fn remove(&self, hash: &Hash) -> Result<bool> {
        Ok(self
            .blocks
            .write()
            .map_err(|_| lock_poisoned("blocks"))?
            .remove(hash)
            .is_some())
    }

    pub fn len(&self) -> usize {
        self.blocks.read().map(|blocks| blocks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_poisoned(what: &str) -> BlockchainError {
    BlockchainError::Database(format!("Memory store {what} lock poisoned"))
}

impl BlockStore for MemoryStore {
    fn put_block(&self, block: &Block) -> Result<()> {
        let bytes = block.serialize()?;
        self.insert_raw(block.hash(), bytes)
    }

    fn get_block(&self, hash: &Hash) -> Result<Option<Block>> {
        let blocks = self.blocks.read().map_err(|_| lock_poisoned("blocks"))?;
        blocks
            .get(hash)
            .map(|bytes| decode_stored_block(hash, bytes))
            .transpose()
    }

    fn get_last_hash(&self) -> Result<Option<Hash>> {
        Ok(*self.last_hash.read().map_err(|_| lock_poisoned("last hash"))?)
    }

    fn update_last_hash(&self, hash: &Hash) -> Result<()> {
        *self
            .last_hash
            .write()
            .map_err(|_| lock_poisoned("last hash"))? = Some(*hash);
        Ok(())
    }
}

// Lets a caller keep a handle on a store it hands to a ledger
impl<S: BlockStore + Sync> BlockStore for std::sync::Arc<S> {
    fn put_block(&self, block: &Block) -> Result<()> {
        (**self).put_block(block)
    }

    fn get_block(&self, hash: &Hash) -> Result<Option<Block>> {
        (**self).get_block(hash)
    }

    fn get_last_hash(&self) -> Result<Option<Hash>> {
        (**self).get_last_hash()
    }

    fn update_last_hash(&self, hash: &Hash) -> Result<()> {
        (**self).update_last_hash(hash)
    }

    fn commit_block(&self, block: &Block) -> Result<()> {
        (**self).commit_block(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ZERO_HASH;
    use crate::testnet::easy_block;

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get_last_hash().unwrap(), None);
        assert_eq!(store.get_block(&ZERO_HASH).unwrap(), None);
    }

    #[test]
    fn test_commit_block_moves_pointer() {
        let store = MemoryStore::new();
        let block = easy_block(ZERO_HASH, 1);
        store.commit_block(&block).unwrap();

        assert_eq!(store.get_last_hash().unwrap(), Some(block.hash()));
        assert_eq!(store.get_block(&block.hash()).unwrap(), Some(block));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let store = MemoryStore::new();
        store.insert_raw([9u8; 32], vec![0xff, 0x00, 0x13]).unwrap();
        assert!(matches!(
            store.get_block(&[9u8; 32]),
            Err(BlockchainError::MalformedChainData(_))
        ));
    }

    #[test]
    fn test_last_hash_length_checked() {
        assert!(decode_last_hash(&[1u8; 32]).is_ok());
        assert!(matches!(
            decode_last_hash(&[1u8; 31]),
            Err(BlockchainError::MalformedChainData(_))
        ));
    }
}
