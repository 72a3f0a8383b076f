//! Cryptographic utility functions

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a cryptographically secure random hex token
pub fn generate_token(byte_len: usize) -> String {
    let mut key = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut key);
    hex::encode(key)
}

/// SHA-256 digest of `data`, hex encoded
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Hash an access token for storage and lookup
pub fn hash_token(token: &str) -> String {
    sha256_hex(token)
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
