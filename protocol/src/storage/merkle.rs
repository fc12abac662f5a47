//! # Merkle Tree
//!
//! Whole-tree root computation over a block's leaves. There are no
//! inclusion proofs here, only the root.
//!
//! ## Construction
//!
//! ```text
//!            root
//!           /    \
//!        h01      h23          hXY = D(hX || hY)   (hex strings, UTF-8)
//!       /   \    /   \
//!     l0    l1  l2   pad       h01 = D(l0.content || l1.content)  (raw bytes)
//! ```
//!
//! `D` is double SHA-256, hex-encoded.
//!
//! 1. An odd leaf count is evened out with one empty-content padding leaf.
//! 2. The bottom level pairs leaves left to right and hashes their raw
//!    *content* (not their identities) concatenated.
//! 3. Each level above pairs the previous level's hex strings, pads an odd
//!    level with an empty string, and hashes the concatenated *text*.
//!    Reduction stops as soon as a single digest remains.
//!
//! The asymmetry between steps 2 and 3 is part of the format: roots
//! computed elsewhere are only comparable if both rules are kept.

use super::node::Node;
use crate::crypto::hash::double_sha256_multi_hex;

/// Digest of one leaf pair: double SHA-256 of `left.content || right.content`.
pub fn leaf_pair_digest(left: &Node, right: &Node) -> String {
    double_sha256_multi_hex(&[left.content(), right.content()])
}

/// Digest of two interior digests: double SHA-256 of their hex text
/// concatenated.
pub fn level_pair_digest(left: &str, right: &str) -> String {
    double_sha256_multi_hex(&[left.as_bytes(), right.as_bytes()])
}

/// Hash the leaves pairwise into the first interior level.
///
/// A trailing unpaired leaf is paired with an empty padding leaf, which
/// contributes zero bytes to the concatenation.
pub fn leaf_level(leaves: &[Node]) -> Vec<String> {
    let padding = Node::padding();
    leaves
        .chunks(2)
        .map(|pair| leaf_pair_digest(&pair[0], pair.get(1).unwrap_or(&padding)))
        .collect()
}

/// Fold interior levels until a single digest remains.
///
/// Returns `None` for an empty level.
pub fn reduce_level(mut level: Vec<String>) -> Option<String> {
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(String::new());
        }
        level = level
            .chunks(2)
            .map(|pair| level_pair_digest(&pair[0], &pair[1]))
            .collect();
    }
    level.pop()
}

/// Merkle root of `leaves` in insertion order, or `None` if there are none.
pub fn compute_merkle_root(leaves: &[Node]) -> Option<String> {
    if leaves.is_empty() {
        return None;
    }
    reduce_level(leaf_level(leaves))
}
