use crate::core::DEFAULT_BITS;
use crate::error::{BlockchainError, Result};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use log::error;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DATA_DIR: &str = "./data";
static DEFAULT_WALLET_FILE: &str = "./wallet.dat";

const DATA_DIR_KEY: &str = "ACCOUNT_BOOK_DATA";
const WALLET_FILE_KEY: &str = "ACCOUNT_BOOK_WALLETS";
const BITS_KEY: &str = "ACCOUNT_BOOK_BITS";
const MINING_ADDRESS_KEY: &str = "MINING_ADDRESS";

pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses eight hex characters, e.g. `1f00ffff`, into compact bits.
pub fn parse_bits(hex: &str) -> Result<[u8; 4]> {
    let bytes = HEXLOWER_PERMISSIVE
        .decode(hex.trim().as_bytes())
        .map_err(|e| BlockchainError::Config(format!("Invalid difficulty bits {hex:?}: {e}")))?;
    <[u8; 4]>::try_from(bytes.as_slice()).map_err(|_| {
        BlockchainError::Config(format!(
            "Difficulty bits must be 4 bytes, got {}",
            bytes.len()
        ))
    })
}

impl Config {
    /// Defaults overlaid with whatever the environment sets.
    pub fn new() -> Config {
        let mut map = HashMap::new();
        map.insert(String::from(DATA_DIR_KEY), String::from(DEFAULT_DATA_DIR));
        map.insert(
            String::from(WALLET_FILE_KEY),
            String::from(DEFAULT_WALLET_FILE),
        );
        map.insert(String::from(BITS_KEY), HEXLOWER.encode(&DEFAULT_BITS));

        for key in [DATA_DIR_KEY, WALLET_FILE_KEY, BITS_KEY, MINING_ADDRESS_KEY] {
            if let Ok(value) = env::var(key) {
                map.insert(String::from(key), value);
            }
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.inner.read() {
            Ok(inner) => inner.get(key).cloned(),
            Err(_) => {
                error!("Failed to acquire read lock on config");
                None
            }
        }
    }

    fn set(&self, key: &str, value: String) {
        match self.inner.write() {
            Ok(mut inner) => {
                inner.insert(String::from(key), value);
            }
            Err(_) => error!("Failed to acquire write lock on config"),
        }
    }

    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(
            self.get(DATA_DIR_KEY)
                .unwrap_or_else(|| String::from(DEFAULT_DATA_DIR)),
        )
    }

    pub fn set_data_dir(&self, dir: String) {
        self.set(DATA_DIR_KEY, dir)
    }

    pub fn get_wallet_file(&self) -> PathBuf {
        PathBuf::from(
            self.get(WALLET_FILE_KEY)
                .unwrap_or_else(|| String::from(DEFAULT_WALLET_FILE)),
        )
    }

    pub fn set_wallet_file(&self, path: String) {
        self.set(WALLET_FILE_KEY, path)
    }

    pub fn get_bits(&self) -> Result<[u8; 4]> {
        match self.get(BITS_KEY) {
            Some(hex) => parse_bits(&hex),
            None => Ok(DEFAULT_BITS),
        }
    }

    pub fn set_bits(&self, bits: [u8; 4]) {
        self.set(BITS_KEY, HEXLOWER.encode(&bits))
    }

    pub fn set_mining_addr(&self, addr: String) {
        self.set(MINING_ADDRESS_KEY, addr)
    }

    pub fn get_mining_addr(&self) -> Option<String> {
        self.get(MINING_ADDRESS_KEY).filter(|addr| !addr.is_empty())
    }

    pub fn is_miner(&self) -> bool {
        self.get_mining_addr().is_some()
    }
}
