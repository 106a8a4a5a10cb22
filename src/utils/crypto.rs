use ring::digest::{digest, Context, SHA256};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING};
use ripemd::{Digest as RipemdDigest, Ripemd160};

use crate::error::{BlockchainError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Width of one P-256 scalar or coordinate in bytes
pub const P256_FIELD_LEN: usize = 32;

// SEC1 tag for an uncompressed point
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Current unix time in whole seconds, truncated to the 32-bit header field.
///
/// A clock set before the epoch yields 0 rather than an error; the value only
/// feeds the block header and is never used for ordering.
pub fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or_default()
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 into a fixed array, for header and Merkle hashes
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest(&SHA256, data).as_ref());
    out
}

pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| BlockchainError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}

pub fn new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| BlockchainError::Crypto(format!("Failed to generate ECDSA key pair: {e}")))?
        .as_ref()
        .to_vec();
    Ok(pkcs8)
}

/// Signs `message` with ECDSA P-256 over its SHA-256 digest.
///
/// The returned signature is the raw `r ‖ s` concatenation, 32 bytes each.
pub fn ecdsa_p256_sha256_sign_digest(pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| {
            BlockchainError::Crypto(format!("Failed to create key pair from PKCS8: {e}"))
        })?;
    let signature = key_pair
        .sign(&rng, message)
        .map_err(|e| BlockchainError::Crypto(format!("Failed to sign message: {e}")))?
        .as_ref()
        .to_vec();
    Ok(signature)
}

/// Checks an `r ‖ s` signature over `message` against a raw `X ‖ Y` public key.
pub fn ecdsa_p256_sha256_sign_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Some((r, s)) = split_signature(signature) else {
        return false;
    };
    let Some(point) = point_from_coordinates(public_key) else {
        return false;
    };

    let mut fixed = Vec::with_capacity(2 * P256_FIELD_LEN);
    fixed.extend_from_slice(r);
    fixed.extend_from_slice(s);

    let peer_public_key = ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, point);
    peer_public_key.verify(message, &fixed).is_ok()
}

/// Splits a raw signature into its `r` and `s` components.
///
/// Returns `None` for anything but two 32-byte, non-zero scalars.
pub fn split_signature(signature: &[u8]) -> Option<(&[u8], &[u8])> {
    if signature.len() != 2 * P256_FIELD_LEN {
        return None;
    }
    let (r, s) = signature.split_at(P256_FIELD_LEN);
    if r.iter().all(|b| *b == 0) || s.iter().all(|b| *b == 0) {
        return None;
    }
    Some((r, s))
}

/// Rebuilds an uncompressed SEC1 point from raw `X ‖ Y` coordinates.
pub fn point_from_coordinates(coordinates: &[u8]) -> Option<Vec<u8>> {
    if coordinates.len() != 2 * P256_FIELD_LEN {
        return None;
    }
    let mut point = Vec::with_capacity(1 + coordinates.len());
    point.push(UNCOMPRESSED_POINT_TAG);
    point.extend_from_slice(coordinates);
    Some(point)
}

/// Strips the SEC1 tag from an uncompressed point, leaving `X ‖ Y`.
pub fn coordinates_from_point(point: &[u8]) -> Result<Vec<u8>> {
    match point.split_first() {
        Some((&UNCOMPRESSED_POINT_TAG, coordinates))
            if coordinates.len() == 2 * P256_FIELD_LEN =>
        {
            Ok(coordinates.to_vec())
        }
        _ => Err(BlockchainError::Crypto(
            "Public key is not an uncompressed P-256 point".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::signature::KeyPair;

    fn key_material() -> (Vec<u8>, Vec<u8>) {
        let pkcs8 = new_key_pair().unwrap();
        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &pkcs8, &rng).unwrap();
        let coordinates = coordinates_from_point(key_pair.public_key().as_ref()).unwrap();
        (pkcs8, coordinates)
    }

    #[test]
    fn test_sign_and_verify_raw_coordinates() {
        let (pkcs8, coordinates) = key_material();
        let signature = ecdsa_p256_sha256_sign_digest(&pkcs8, b"ledger message").unwrap();

        assert_eq!(signature.len(), 64);
        assert!(ecdsa_p256_sha256_sign_verify(
            &coordinates,
            &signature,
            b"ledger message"
        ));
        assert!(!ecdsa_p256_sha256_sign_verify(
            &coordinates,
            &signature,
            b"other message"
        ));
    }

    #[test]
    fn test_malformed_signature_fails_closed() {
        let (_, coordinates) = key_material();
        assert!(!ecdsa_p256_sha256_sign_verify(&coordinates, &[], b"m"));
        assert!(!ecdsa_p256_sha256_sign_verify(&coordinates, &[0u8; 64], b"m"));
        assert!(!ecdsa_p256_sha256_sign_verify(&coordinates, &[1u8; 63], b"m"));
    }

    #[test]
    fn test_malformed_public_key_fails_closed() {
        let (pkcs8, coordinates) = key_material();
        let signature = ecdsa_p256_sha256_sign_digest(&pkcs8, b"m").unwrap();
        assert!(!ecdsa_p256_sha256_sign_verify(
            &coordinates[1..],
            &signature,
            b"m"
        ));
    }

    #[test]
    fn test_sha256_hash_matches_digest() {
        let data = b"abc";
        assert_eq!(sha256_hash(data).to_vec(), sha256_digest(data));
    }

    #[test]
    fn test_ripemd160_length() {
        assert_eq!(ripemd160_digest(b"abc").len(), 20);
    }
}
