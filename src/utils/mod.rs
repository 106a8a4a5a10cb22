//! Utility functions and helpers
//!
//! Hashing, ECDSA P-256 signing with raw `r ‖ s` / `X ‖ Y` encodings,
//! Base58, and the bincode helpers shared by the store and the wallet file.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, coordinates_from_point, ecdsa_p256_sha256_sign_digest,
    ecdsa_p256_sha256_sign_verify, new_key_pair, point_from_coordinates, ripemd160_digest,
    sha256_digest, sha256_hash, split_signature, unix_timestamp,
};

pub use serialization::{deserialize, deserialize_exact, serialize};
