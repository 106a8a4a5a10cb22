use crate::core::{Block, Hash};
use crate::error::{BlockchainError, Result};
use crate::storage::block_store::{decode_last_hash, decode_stored_block, BlockStore};
use log::debug;
use sled::transaction::TransactionError;
use sled::{Db, Tree};
use std::path::Path;

const BLOCKS_TREE: &str = "blocks";
const LAST_HASH_KEY: &str = "last_hash";

/// Sled-backed block store. Blocks and the last-hash pointer share one tree
/// so a commit is a single sled transaction.
pub struct SledStore {
    db: Db,
    blocks: Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<SledStore> {
        let path = path.as_ref();
        let db = sled::open(path)
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BlockchainError::Database(format!("Failed to open blocks tree: {e}")))?;
        debug!("Opened block store at {}", path.display());
        Ok(SledStore { db, blocks })
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush database: {e}")))?;
        Ok(())
    }
}

impl BlockStore for SledStore {
    fn put_block(&self, block: &Block) -> Result<()> {
        let data = block.serialize()?;
        self.blocks
            .insert(block.hash(), data)
            .map_err(|e| BlockchainError::Database(format!("Failed to store block: {e}")))?;
        self.flush()
    }

    fn get_block(&self, hash: &Hash) -> Result<Option<Block>> {
        self.blocks
            .get(hash)
            .map_err(|e| BlockchainError::Database(format!("Failed to get block: {e}")))?
            .map(|bytes| decode_stored_block(hash, bytes.as_ref()))
            .transpose()
    }

    fn get_last_hash(&self) -> Result<Option<Hash>> {
        self.blocks
            .get(LAST_HASH_KEY)
            .map_err(|e| BlockchainError::Database(format!("Failed to get last hash: {e}")))?
            .map(|bytes| decode_last_hash(bytes.as_ref()))
            .transpose()
    }

    fn update_last_hash(&self, hash: &Hash) -> Result<()> {
        self.blocks
            .insert(LAST_HASH_KEY, &hash[..])
            .map_err(|e| BlockchainError::Database(format!("Failed to update last hash: {e}")))?;
        self.flush()
    }

    fn commit_block(&self, block: &Block) -> Result<()> {
        let block_hash = block.hash();
        let block_data = block.serialize()?;

        self.blocks
            .transaction(|tx_db| {
                tx_db.insert(&block_hash[..], block_data.as_slice())?;
                tx_db.insert(LAST_HASH_KEY, &block_hash[..])?;
                Ok(())
            })
            .map_err(|e: TransactionError| {
                BlockchainError::Database(format!("Failed to commit block: {e}"))
            })?;
        self.flush()
    }
}
