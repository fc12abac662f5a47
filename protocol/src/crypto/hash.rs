//! # Hashing Utilities
//!
//! Cryptographic hash functions used throughout Sapphire. There is exactly
//! one primitive, SHA-256, used in two shapes:
//!
//! - **Single SHA-256** for identities: a leaf's identity is the digest of
//!   its content, and a block's identity is the digest of a timestamp plus
//!   a random salt.
//!
//! - **Double SHA-256** (`SHA-256(SHA-256(x))`) for every internal node of
//!   the Merkle tree. Hashing twice closes the length-extension gap that a
//!   bare Merkle-Damgard construction leaves open.
//!
//! Everything that leaves this module as an identifier is lowercase hex.
//! The raw-byte variants exist for callers that chain hashes.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use sapphire_protocol::crypto::sha256;
///
/// let hash = sha256(b"sapphire");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 of the input, hex-encoded. This is the identity function for
/// leaf records.
///
/// # Example
///
/// ```
/// use sapphire_protocol::crypto::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Double SHA-256, hex-encoded. Every pair digest in the Merkle tree is
/// produced by this function.
///
/// # Example
///
/// ```
/// use sapphire_protocol::crypto::{double_sha256_hex, sha256, sha256_hex};
///
/// assert_eq!(double_sha256_hex(b"ab"), sha256_hex(&sha256(b"ab")));
/// ```
pub fn double_sha256_hex(data: &[u8]) -> String {
    hex::encode(double_sha256(data))
}

/// Double SHA-256 over several byte slices fed back to back.
///
/// Equivalent to hashing their concatenation, without building the
/// temporary buffer. Leaf contents can be large, so the Merkle builder
/// streams `left || right` through this instead of allocating.
pub fn double_sha256_multi_hex(parts: &[&[u8]]) -> String {
    let mut inner = Sha256::new();
    for part in parts {
        inner.update(part);
    }
    let first = inner.finalize();
    let mut outer = Sha256::new();
    outer.update(first);
    hex::encode(outer.finalize())
}
