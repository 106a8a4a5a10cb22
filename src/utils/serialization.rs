// Binary encoding for blocks, transactions and the wallet file.
// Everything goes through bincode 2 with the standard configuration so the
// digests computed over encoded bytes stay stable within this crate.
use crate::error::{BlockchainError, Result};

pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

pub fn deserialize<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}

/// Like [`deserialize`] but rejects trailing bytes, for records read back from
/// a store where a short decode means corruption.
pub fn deserialize_exact<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let config = bincode::config::standard();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Trailing data: decoded {read} of {} bytes",
            bytes.len()
        )));
    }
    Ok(data)
}
