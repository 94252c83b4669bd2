//! Salted password digests and registration verification codes.
//! Passwords are never stored in the clear.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

/// Generate a fresh hex-encoded salt for a new account.
pub fn new_salt() -> String {
    let bytes: [u8; SALT_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// Hex SHA-256 digest of salt followed by password.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Five-digit numeric code, zero-padded.
pub fn verification_code() -> String {
    let n: u32 = rand::rng().random_range(0..100_000);
    format!("{n:05}")
}
