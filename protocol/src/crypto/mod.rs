//! # Cryptographic Primitives for Sapphire
//!
//! Every digest in the system flows through here: leaf identities, block
//! identities, and the pair digests of the Merkle tree.
//!
//! This is a thin, type-safe wrapper around the audited `sha2` crate.
//! Nothing in here is clever, and it should stay that way.

pub mod hash;

pub use hash::{double_sha256, double_sha256_hex, sha256, sha256_hex};
