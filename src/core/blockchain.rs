// The ledger: an append-only list of sealed blocks, genesis first, mirrored
// into a BlockStore. Blocks are only ever added by draining a TxPool.

use crate::core::{Block, Hash, ProofOfWork, Transaction, TransactionResolver, ZERO_HASH};
use crate::error::{BlockchainError, Result};
use crate::storage::{BlockStore, TxPool};
use data_encoding::HEXLOWER;
use log::{debug, info};

pub struct Blockchain {
    blocks: Vec<Block>,
    store: Box<dyn BlockStore>,
    bits: [u8; 4],
}

impl Blockchain {
    /// Loads the chain held by `store`, or writes a fresh genesis block when
    /// the store is empty. New blocks are sealed against `bits`.
    pub fn open(store: Box<dyn BlockStore>, bits: [u8; 4]) -> Result<Blockchain> {
        // reject unusable difficulty before anything is written
        ProofOfWork::new(bits)?;

        let blocks = match store.get_last_hash()? {
            Some(last_hash) => Self::load_chain(store.as_ref(), last_hash)?,
            None => {
                let genesis = Block::generate_genesis_block(bits);
                store.commit_block(&genesis)?;
                info!("Created genesis block {}", HEXLOWER.encode(&genesis.hash()));
                vec![genesis]
            }
        };

        info!(
            "Opened ledger at height {} (tip {})",
            blocks.len() - 1,
            HEXLOWER.encode(&blocks[blocks.len() - 1].hash())
        );
        Ok(Blockchain {
            blocks,
            store,
            bits,
        })
    }

    // Walks previous-hash links from the tip down to genesis
    fn load_chain(store: &dyn BlockStore, last_hash: Hash) -> Result<Vec<Block>> {
        let mut blocks = vec![];
        let mut current = last_hash;
        loop {
            let block = store.get_block(&current)?.ok_or_else(|| {
                BlockchainError::MalformedChainData(format!(
                    "Block {} is missing from the store",
                    HEXLOWER.encode(&current)
                ))
            })?;
            if block.hash() != current {
                return Err(BlockchainError::MalformedChainData(format!(
                    "Block stored under {} hashes to {}",
                    HEXLOWER.encode(&current),
                    HEXLOWER.encode(&block.hash())
                )));
            }

            let previous = *block.get_previous_hash();
            blocks.push(block);
            if previous == ZERO_HASH {
                break;
            }
            current = previous;
        }
        blocks.reverse();
        debug!("Loaded {} blocks from the store", blocks.len());
        Ok(blocks)
    }

    /// Seals everything pending in `pool` into a new block on the tip.
    ///
    /// An empty pool produces nothing. A non-empty `reward_address` gets a
    /// coinbase placed first in the block. The block is persisted before it
    /// joins the in-memory chain.
    pub fn add_block(&mut self, pool: &mut TxPool, reward_address: &str) -> Result<Option<Block>> {
        if pool.is_empty() {
            debug!("No pending transactions, skipping block");
            return Ok(None);
        }

        let next_height = self.height() + 1;
        let mut transactions = Vec::with_capacity(pool.len() + 1);
        if !reward_address.is_empty() {
            let note = format!("Reward to '{reward_address}' at height {next_height}");
            transactions.push(Transaction::new_coinbase_tx(reward_address, &note)?);
        }
        let pending = pool.drain();
        transactions.extend(pending.iter().cloned());

        let sealed = Block::mine_block(self.tip_hash(), transactions, self.bits)
            .and_then(|block| self.store.commit_block(&block).map(|()| block));
        let block = match sealed {
            Ok(block) => block,
            Err(e) => {
                // the chain is unchanged, so the drained work stays pending
                for tx in pending {
                    pool.add(tx);
                }
                return Err(e);
            }
        };
        info!(
            "Added block {} at height {next_height} with {} transactions",
            HEXLOWER.encode(&block.hash()),
            block.get_transactions().len()
        );
        self.blocks.push(block.clone());
        Ok(Some(block))
    }

    pub fn find_transaction(&self, txid: &[u8]) -> Option<Transaction> {
        self.iter_back()
            .flat_map(|block| block.get_transactions())
            .find(|tx| tx.get_id() == txid)
            .cloned()
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.hash() == hash)
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    /// Genesis sits at height 0.
    pub fn height(&self) -> usize {
        self.blocks.len().saturating_sub(1)
    }

    pub fn tip_hash(&self) -> Hash {
        self.blocks.last().map_or(ZERO_HASH, Block::hash)
    }

    pub fn bits(&self) -> [u8; 4] {
        self.bits
    }

    pub fn iter_back(&self) -> BlockchainIterator<'_> {
        BlockchainIterator {
            blocks: self.blocks.as_slice(),
        }
    }

    /// Checks hash links, proof-of-work and Merkle roots across the chain.
    pub fn validate(&self) -> Result<()> {
        let mut previous = ZERO_HASH;
        for (height, block) in self.blocks.iter().enumerate() {
            if block.get_previous_hash() != &previous {
                return Err(BlockchainError::InvalidBlock(format!(
                    "Block at height {height} does not link to its predecessor"
                )));
            }
            if height == 0 {
                if !block.get_transactions().is_empty() || block.get_merkle_root() != &ZERO_HASH {
                    return Err(BlockchainError::InvalidBlock(
                        "Genesis block carries transactions".to_string(),
                    ));
                }
            } else {
                if !ProofOfWork::validate(block) {
                    return Err(BlockchainError::InvalidBlock(format!(
                        "Block at height {height} does not meet its target"
                    )));
                }
                if !block.verify_merkle_root()? {
                    return Err(BlockchainError::InvalidBlock(format!(
                        "Block at height {height} has a wrong Merkle root"
                    )));
                }
            }
            previous = block.hash();
        }
        Ok(())
    }
}

impl TransactionResolver for Blockchain {
    fn resolve_transaction(&self, txid: &[u8]) -> Option<Transaction> {
        self.find_transaction(txid)
    }
}

/// Walks the chain from the tip back to genesis
pub struct BlockchainIterator<'a> {
    blocks: &'a [Block],
}

impl<'a> Iterator for BlockchainIterator<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let (last, rest) = self.blocks.split_last()?;
        self.blocks = rest;
        Some(last)
    }
}
