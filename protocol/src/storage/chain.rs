//! Ordered sequence of blocks linked by identity.
//!
//! A [`Chain`] is the caller-side bookkeeping that the block itself knows
//! nothing about: which block is the tip, when to seal
//! it, and how to start the next one. It applies the conventional rotation
//! policy: when the tip reports that it is full, build it, open a block
//! chained to it, and retry the append exactly once.

use std::sync::Arc;

use tracing::{info, warn};

use super::block::{Block, BlockSummary};
use super::error::BlockError;
use super::node::Node;
use crate::config::BlockConfig;

/// Where an appended leaf ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the block that accepted the leaf.
    pub block_index: usize,
    /// Whether the tip had to be sealed and replaced first.
    pub rotated: bool,
}

/// Ordered chain of blocks, root first.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Arc<Block>>,
    config: BlockConfig,
}

impl Chain {
    /// A chain holding a single empty root block with the default budget.
    pub fn new() -> Result<Self, BlockError> {
        Self::with_config(BlockConfig::default())
    }

    /// A chain whose blocks all use `config`.
    pub fn with_config(config: BlockConfig) -> Result<Self, BlockError> {
        let root = Block::root_with_config(config)?;
        Ok(Self {
            blocks: vec![Arc::new(root)],
            config,
        })
    }

    /// Append `node` to the tip, rotating once if the tip is full.
    ///
    /// # Errors
    ///
    /// `LeafTooLarge` when the leaf exceeds the capacity outright, or
    /// `CapacityExceeded` when it is exactly the capacity. Neither touches
    /// the tip. A second capacity failure after rotation is returned as-is.
    pub fn append(&mut self, node: Node) -> Result<Placement, BlockError> {
        let size = node.size();
        let capacity = self.config.capacity;
        if size >= capacity {
            let err = if size > capacity {
                BlockError::LeafTooLarge { size, capacity }
            } else {
                BlockError::CapacityExceeded {
                    weight: self.tip().weight(),
                    size,
                    capacity,
                }
            };
            warn!(size, capacity, "leaf does not fit in any block");
            return Err(err);
        }

        match self.tip().offer(node) {
            Ok(()) => Ok(Placement {
                block_index: self.blocks.len() - 1,
                rotated: false,
            }),
            Err((err, node)) if err.is_capacity_exhausted() => {
                self.rotate()?;
                self.tip().add_node(node)?;
                Ok(Placement {
                    block_index: self.blocks.len() - 1,
                    rotated: true,
                })
            }
            Err((err, _)) => Err(err),
        }
    }

    /// Seal the current tip and open a new block chained to it.
    pub fn rotate(&mut self) -> Result<&Arc<Block>, BlockError> {
        let sealed = Arc::clone(self.tip());
        if !sealed.is_sealed() {
            sealed.build()?;
        }
        let next = Block::chained_with_config(sealed.identity(), self.config)?;
        info!(
            sealed = %sealed.identity(),
            weight = sealed.weight(),
            height = sealed.height(),
            next = %next.identity(),
            "block rotated"
        );
        self.blocks.push(Arc::new(next));
        Ok(self.tip())
    }

    /// Build the tip. Returns its Merkle root.
    pub fn seal(&self) -> Result<String, BlockError> {
        self.tip().build()
    }

    /// The block currently accepting leaves.
    pub fn tip(&self) -> &Arc<Block> {
        // A chain is never empty: construction always installs a root block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Block>> {
        self.blocks.get(index)
    }

    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    /// Number of blocks, never zero. A fresh chain has one empty root
    /// block, so `len() == 1` while [`Chain::is_empty`] is still true.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no block holds a leaf. Unlike [`Chain::len`] this counts
    /// leaves, not blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.height() == 0)
    }

    pub fn config(&self) -> BlockConfig {
        self.config
    }

    /// Total leaves across all blocks.
    pub fn leaf_count(&self) -> usize {
        self.blocks.iter().map(|b| b.height()).sum()
    }

    /// Check that the first block is a root and every later block names
    /// its predecessor's identity.
    pub fn verify_links(&self) -> bool {
        let Some(first) = self.blocks.first() else {
            return false;
        };
        if !first.is_root() {
            return false;
        }
        self.blocks
            .windows(2)
            .all(|pair| pair[1].previous_identity() == pair[0].identity())
    }

    pub fn summaries(&self) -> Vec<BlockSummary> {
        self.blocks.iter().map(|b| b.summary()).collect()
    }
}
