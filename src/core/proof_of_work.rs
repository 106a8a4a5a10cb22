use crate::core::{Block, Hash};
use crate::error::{BlockchainError, Result};
use crate::utils::unix_timestamp;
use data_encoding::HEXLOWER;
use log::{debug, info};
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};

// Attempts between progress lines at debug level
const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Decodes compact difficulty bits into a 32-byte big-endian target.
///
/// `bits[0]` is the exponent and `bits[1..4]` the big-endian coefficient:
/// `target = coefficient << 8 * (exponent - 3)`.
pub fn compact_to_target(bits: [u8; 4]) -> Result<Hash> {
    let exponent = bits[0];
    if exponent < 3 {
        return Err(BlockchainError::InvalidTarget(format!(
            "exponent {exponent} in bits {} is below 3",
            HEXLOWER.encode(&bits)
        )));
    }

    let coefficient = u32::from_be_bytes([0, bits[1], bits[2], bits[3]]);
    let target = BigUint::from(coefficient) << (8 * (usize::from(exponent) - 3));
    let bytes = target.to_bytes_be();
    if bytes.len() > 32 {
        return Err(BlockchainError::InvalidTarget(format!(
            "bits {} describe a target wider than 256 bits",
            HEXLOWER.encode(&bits)
        )));
    }

    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Seals block headers against a fixed target.
pub struct ProofOfWork {
    target: Hash,
}

impl ProofOfWork {
    pub fn new(bits: [u8; 4]) -> Result<ProofOfWork> {
        Ok(ProofOfWork {
            target: compact_to_target(bits)?,
        })
    }

    pub fn target(&self) -> &Hash {
        &self.target
    }

    /// Byte-wise comparison of two big-endian arrays is numeric comparison.
    pub fn meets_target(&self, hash: &Hash) -> bool {
        hash <= &self.target
    }

    /// Validate proof-of-work for a block
    pub fn validate(block: &Block) -> bool {
        match ProofOfWork::new(block.get_bits()) {
            Ok(pow) => pow.meets_target(&block.hash()),
            Err(_) => false,
        }
    }

    /// Bumps nonce and timestamp until the header hash is at or below the
    /// target. Blocks the calling thread until it succeeds.
    pub fn run(&self, block: &mut Block) -> Hash {
        let never = AtomicBool::new(false);
        // without a cancellation source the loop only exits on success
        self.search(block, &never).unwrap_or_else(|| block.hash())
    }

    /// Same search as [`run`](Self::run), giving up with `None` once `cancel`
    /// is set. The flag is checked before every attempt.
    pub fn run_cancellable(&self, block: &mut Block, cancel: &AtomicBool) -> Option<Hash> {
        self.search(block, cancel)
    }

    fn search(&self, block: &mut Block, cancel: &AtomicBool) -> Option<Hash> {
        let mut attempts: u64 = 0;
        let mut hash = block.hash();
        loop {
            if cancel.load(Ordering::Relaxed) {
                info!("Mining cancelled after {attempts} attempts");
                return None;
            }
            if self.meets_target(&hash) {
                info!(
                    "Block mined: {} (nonce {}, {attempts} attempts)",
                    HEXLOWER.encode(&hash),
                    block.get_nonce()
                );
                return Some(hash);
            }

            block.next_attempt(unix_timestamp());
            hash = block.hash();
            attempts += 1;
            if attempts % PROGRESS_INTERVAL == 0 {
                debug!("Still mining: {attempts} attempts, current {}", HEXLOWER.encode(&hash));
            }
        }
    }
}
