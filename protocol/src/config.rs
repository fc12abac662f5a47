//! # Protocol Configuration & Constants
//!
//! Every magic number in Sapphire lives here. If you're hardcoding a block
//! budget or a digest length somewhere else, move it here.
//!
//! The capacity budget is shared by every block in a chain. Changing it
//! changes where blocks split, and therefore every Merkle root downstream,
//! so treat it as part of the data format.

use serde::{Deserialize, Serialize};

use crate::storage::error::BlockError;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the block format.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Hashing Parameters
// ---------------------------------------------------------------------------

/// Hash function used for leaf identities, block identities, and the
/// Merkle tree. Leaf pairs and tree levels use it twice in a row.
pub const PRIMARY_HASH_FUNCTION: &str = "SHA-256";

/// SHA-256 output length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a hex-encoded digest. Every identity and every Merkle root
/// is exactly this many lowercase hex characters.
pub const HEX_DIGEST_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

/// Bytes of OS randomness mixed into a block identity. 128 bits is
/// plenty for a uniqueness token that is never used as a secret.
pub const IDENTITY_SALT_BYTES: usize = 16;

// ---------------------------------------------------------------------------
// Block Limits
// ---------------------------------------------------------------------------

/// Default byte budget of a block: the sum of leaf content lengths must
/// stay strictly below this value. Roughly a gigabyte.
pub const BLOCK_CAPACITY: usize = 1_024_000_000;

/// Tunable block parameters.
///
/// There is exactly one knob today. Production chains use the default;
/// tests and the driver's `--capacity` flag shrink it so rotation can be
/// observed without allocating a gigabyte of payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Byte budget for the block.
    pub capacity: usize,
}

impl BlockConfig {
    /// Config with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Rejects budgets that could never hold a leaf.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.capacity == 0 {
            return Err(BlockError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            capacity: BLOCK_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(BlockConfig::default().capacity, BLOCK_CAPACITY);
        assert!(BlockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = BlockConfig::with_capacity(0).validate().unwrap_err();
        assert!(matches!(err, BlockError::InvalidCapacity));
    }

    #[test]
    fn test_digest_length_constants() {
        assert_eq!(HASH_OUTPUT_LENGTH, 32);
        assert_eq!(HEX_DIGEST_LENGTH, 64);
        assert!(IDENTITY_SALT_BYTES >= 8);
    }
}
