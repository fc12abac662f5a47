//! Error types for leaf records and blocks.
//!
//! None of these are retried inside the library. Whether a capacity error
//! means "rotate and try again" or "give up" is the caller's decision.

use thiserror::Error;

/// Errors raised while assigning content to a leaf record.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The payload could not be serialized into its canonical byte form.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] bincode::Error),
}

/// Errors raised by block construction, appends, and finalization.
#[derive(Debug, Error)]
pub enum BlockError {
    /// The OS random source failed while deriving a block identity.
    #[error("failed to derive block identity: {0}")]
    Identity(#[source] rand::Error),

    /// A chained block was requested without a predecessor identity.
    #[error("previous block identity is not set")]
    EmptyPredecessor,

    /// A block budget of zero bytes was requested.
    #[error("block capacity must be greater than zero")]
    InvalidCapacity,

    /// A single leaf is larger than the whole block budget.
    #[error("leaf of {size} bytes exceeds block capacity of {capacity} bytes")]
    LeafTooLarge {
        /// Content length of the rejected leaf.
        size: usize,
        /// Block budget.
        capacity: usize,
    },

    /// The block has no room left for the leaf.
    #[error("block capacity exceeded: weight {weight} + leaf {size} bytes, capacity {capacity} bytes")]
    CapacityExceeded {
        /// Weight of the block at the time of the append.
        weight: usize,
        /// Content length of the rejected leaf.
        size: usize,
        /// Block budget.
        capacity: usize,
    },

    /// `build` was called on a block without leaves.
    #[error("cannot build an empty block")]
    EmptyBlock,

    /// The block was already built and no longer accepts leaves.
    #[error("block {identity} is sealed")]
    Sealed {
        /// Identity of the sealed block.
        identity: String,
    },

    /// A leaf record operation failed.
    #[error(transparent)]
    Node(#[from] NodeError),
}

impl BlockError {
    /// True for the errors a driver recovers from by starting a new block.
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. } | Self::Sealed { .. })
    }

    /// True when the leaf would be refused by an empty block too, so no
    /// amount of rotation places it.
    pub fn is_unplaceable(&self) -> bool {
        match self {
            Self::LeafTooLarge { .. } => true,
            Self::CapacityExceeded { size, capacity, .. } => size >= capacity,
            _ => false,
        }
    }
}
