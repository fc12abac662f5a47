//! # Storage Module
//!
//! The in-memory data structures that make up a Sapphire chain.
//!
//! ## Architecture
//!
//! ```text
//! node.rs   - Leaf records: content, predecessor label, content identity
//! merkle.rs - Whole-tree Merkle root over a block's leaves
//! block.rs  - Capacity-bounded leaf container, build/verify/lookup
//! chain.rs  - Ordered block sequence with the rotate-on-full policy
//! error.rs  - NodeError and BlockError
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! payload → Node ──append──→ Block ──build──→ merkle_root
//!                              │
//!                         (full? rotate)
//!                              ↓
//!                  Block(previous = sealed.identity)
//! ```
//!
//! Nothing here touches the disk. A chain lives exactly as long as the
//! process that built it.

pub mod block;
pub mod chain;
pub mod error;
pub mod merkle;
pub mod node;

pub use block::{Block, BlockSummary, Container};
pub use chain::{Chain, Placement};
pub use error::{BlockError, NodeError};
pub use merkle::compute_merkle_root;
pub use node::Node;
