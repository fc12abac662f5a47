//! # Block Structure
//!
//! A block is a bounded, append-only container of leaf records committed
//! to by a single Merkle root.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Block                                       │
//! │  ├── identity: String        (random token)  │
//! │  ├── previous_identity: String               │
//! │  ├── capacity: usize         (byte budget)   │
//! │  └── state: Mutex<BlockState>                │
//! │       ├── leaves: Vec<Node>                  │
//! │       ├── weight: usize      (Σ leaf sizes)  │
//! │       ├── height: usize      (leaf count)    │
//! │       └── merkle_root: Option<String>        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//!
//! A block's identity is `hex(SHA-256(timestamp || hex(salt)))` where the
//! salt is 128 bits from the OS random source. It is a uniqueness token,
//! not a commitment: two blocks with identical leaves have different
//! identities. The commitment is the Merkle root.
//!
//! ## Capacity
//!
//! An append is rejected, before anything is mutated, when:
//!
//! 1. the leaf alone is larger than the budget (`LeafTooLarge`), or
//! 2. the block is already at or past the budget, or the leaf would take
//!    it there (`CapacityExceeded`).
//!
//! The existing-weight check runs first. A leaf may bring the weight to
//! `capacity - 1` and still be accepted.
//!
//! ## Locking
//!
//! Appends and builds take the block's mutex for their whole duration, so
//! the leaf sequence, weight, height, and root change as one unit. Blocks
//! are independent: there is no lock shared between them.

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::BlockError;
use super::merkle::compute_merkle_root;
use super::node::Node;
use crate::config::{BlockConfig, IDENTITY_SALT_BYTES};
use crate::crypto::hash::sha256_hex;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Anything that accepts leaves and answers membership questions.
pub trait Container {
    /// Append a single leaf.
    fn add_node(&self, node: Node) -> Result<(), BlockError>;

    /// Append leaves in order, stopping at the first rejection.
    fn add_nodes(&self, nodes: Vec<Node>) -> Result<(), BlockError>;

    /// Check a claimed root against the stored one.
    fn verify(&self, claimed_root: &str) -> bool;

    /// Find a leaf by identity.
    fn get_node(&self, identity: &str) -> Option<Node>;
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// Everything the block lock guards.
#[derive(Clone, Debug, Default)]
struct BlockState {
    leaves: Vec<Node>,
    /// Index of the designated root leaf. Set by the first append.
    root_leaf: Option<usize>,
    weight: usize,
    height: usize,
    merkle_root: Option<String>,
}

/// A bounded container of leaf records with a Merkle commitment.
///
/// Share a block across threads with `Arc<Block>`; every method takes
/// `&self`.
#[derive(Debug)]
pub struct Block {
    identity: String,
    previous_identity: String,
    capacity: usize,
    state: Mutex<BlockState>,
}

impl Block {
    /// The first block of a chain, with the default capacity.
    pub fn new_root() -> Result<Self, BlockError> {
        Self::root_with_config(BlockConfig::default())
    }

    /// A block chained to `previous_identity`, with the default capacity.
    ///
    /// # Errors
    ///
    /// `EmptyPredecessor` if `previous_identity` is empty.
    pub fn new(previous_identity: impl Into<String>) -> Result<Self, BlockError> {
        Self::chained_with_config(previous_identity, BlockConfig::default())
    }

    /// Root block with a custom budget.
    pub fn root_with_config(config: BlockConfig) -> Result<Self, BlockError> {
        Self::construct(String::new(), config)
    }

    /// Chained block with a custom budget.
    pub fn chained_with_config(
        previous_identity: impl Into<String>,
        config: BlockConfig,
    ) -> Result<Self, BlockError> {
        let previous_identity = previous_identity.into();
        if previous_identity.is_empty() {
            return Err(BlockError::EmptyPredecessor);
        }
        Self::construct(previous_identity, config)
    }

    fn construct(previous_identity: String, config: BlockConfig) -> Result<Self, BlockError> {
        config.validate()?;
        let identity = derive_identity()?;
        debug!(
            identity = %identity,
            previous = %previous_identity,
            capacity = config.capacity,
            "block created"
        );
        Ok(Self {
            identity,
            previous_identity,
            capacity: config.capacity,
            state: Mutex::new(BlockState::default()),
        })
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append one leaf.
    ///
    /// # Errors
    ///
    /// - `Sealed` once the block has been built.
    /// - `LeafTooLarge` if the leaf alone exceeds capacity.
    /// - `CapacityExceeded` if the block is full or the leaf would fill it.
    pub fn add_node(&self, node: Node) -> Result<(), BlockError> {
        self.offer(node).map_err(|(err, _)| err)
    }

    /// [`Block::add_node`] that hands the leaf back on rejection, so a
    /// caller can retry it elsewhere without cloning it up front.
    pub fn offer(&self, node: Node) -> Result<(), (BlockError, Node)> {
        let mut state = self.state.lock();
        self.append_locked(&mut state, node)
    }

    /// Append leaves in order under a single lock acquisition.
    ///
    /// Leaves accepted before a rejection stay in the block.
    pub fn add_nodes<I>(&self, nodes: I) -> Result<(), BlockError>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut state = self.state.lock();
        self.check_weight(&state, 0)?;
        for node in nodes {
            self.append_locked(&mut state, node).map_err(|(err, _)| err)?;
        }
        Ok(())
    }

    /// Compute and store the Merkle root, sealing the block.
    ///
    /// Building again recomputes the same root from the same leaves.
    ///
    /// # Errors
    ///
    /// `EmptyBlock` if there are no leaves; the stored root is untouched.
    pub fn build(&self) -> Result<String, BlockError> {
        let mut state = self.state.lock();
        let root = compute_merkle_root(&state.leaves).ok_or(BlockError::EmptyBlock)?;
        debug!(
            identity = %self.identity,
            leaves = state.leaves.len(),
            padded = state.leaves.len() % 2 == 1,
            weight = state.weight,
            root = %root,
            "block built"
        );
        state.merkle_root = Some(root.clone());
        Ok(root)
    }

    fn append_locked(
        &self,
        state: &mut BlockState,
        node: Node,
    ) -> Result<(), (BlockError, Node)> {
        let size = node.size();
        if let Err(err) = self.admit(state, size) {
            return Err((err, node));
        }

        if state.leaves.is_empty() {
            state.root_leaf = Some(0);
        }
        state.leaves.push(node);
        state.weight = state.leaves.iter().map(Node::size).sum();
        state.height = state.leaves.len();

        trace!(
            identity = %self.identity,
            size,
            weight = state.weight,
            height = state.height,
            "leaf appended"
        );
        Ok(())
    }

    fn admit(&self, state: &BlockState, size: usize) -> Result<(), BlockError> {
        if state.merkle_root.is_some() {
            return Err(BlockError::Sealed {
                identity: self.identity.clone(),
            });
        }
        if size > self.capacity {
            return Err(BlockError::LeafTooLarge {
                size,
                capacity: self.capacity,
            });
        }
        self.check_weight(state, size)
    }

    fn check_weight(&self, state: &BlockState, size: usize) -> Result<(), BlockError> {
        if state.weight >= self.capacity || state.weight.saturating_add(size) >= self.capacity {
            return Err(BlockError::CapacityExceeded {
                weight: state.weight,
                size,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Verification & lookup
    // -----------------------------------------------------------------------

    /// True iff `claimed_root` equals the stored root. Nothing is recomputed;
    /// an unbuilt block verifies nothing.
    pub fn verify(&self, claimed_root: &str) -> bool {
        self.state.lock().merkle_root.as_deref() == Some(claimed_root)
    }

    /// Recompute the root from the current leaves and compare it with the
    /// stored one. False for an unbuilt block.
    pub fn audit(&self) -> bool {
        let state = self.state.lock();
        match &state.merkle_root {
            Some(stored) => compute_merkle_root(&state.leaves).as_ref() == Some(stored),
            None => false,
        }
    }

    /// First leaf whose identity is `identity`.
    pub fn get_node(&self, identity: &str) -> Option<Node> {
        self.state
            .lock()
            .leaves
            .iter()
            .find(|node| node.identity() == Some(identity))
            .cloned()
    }

    /// The designated root leaf, i.e. the first leaf appended.
    pub fn root_node(&self) -> Option<Node> {
        let state = self.state.lock();
        state.root_leaf.and_then(|i| state.leaves.get(i)).cloned()
    }

    /// Snapshot of the leaves in insertion order.
    pub fn leaves(&self) -> Vec<Node> {
        self.state.lock().leaves.clone()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Identity of the preceding block. Empty for a root block.
    pub fn previous_identity(&self) -> &str {
        &self.previous_identity
    }

    pub fn is_root(&self) -> bool {
        self.previous_identity.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of content lengths over all leaves.
    pub fn weight(&self) -> usize {
        self.state.lock().weight
    }

    /// Number of leaves.
    pub fn height(&self) -> usize {
        self.state.lock().height
    }

    /// Bytes left before the budget is reached.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.weight())
    }

    /// The root computed by the last successful [`Block::build`].
    pub fn merkle_root(&self) -> Option<String> {
        self.state.lock().merkle_root.clone()
    }

    pub fn is_sealed(&self) -> bool {
        self.state.lock().merkle_root.is_some()
    }

    /// Point-in-time summary for reporting.
    pub fn summary(&self) -> BlockSummary {
        let state = self.state.lock();
        BlockSummary {
            identity: self.identity.clone(),
            previous_identity: self.previous_identity.clone(),
            capacity: self.capacity,
            weight: state.weight,
            height: state.height,
            merkle_root: state.merkle_root.clone(),
        }
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            previous_identity: self.previous_identity.clone(),
            capacity: self.capacity,
            state: Mutex::new(self.state.lock().clone()),
        }
    }
}

impl Container for Block {
    fn add_node(&self, node: Node) -> Result<(), BlockError> {
        Block::add_node(self, node)
    }

    fn add_nodes(&self, nodes: Vec<Node>) -> Result<(), BlockError> {
        Block::add_nodes(self, nodes)
    }

    fn verify(&self, claimed_root: &str) -> bool {
        Block::verify(self, claimed_root)
    }

    fn get_node(&self, identity: &str) -> Option<Node> {
        Block::get_node(self, identity)
    }
}

/// Serializable view of a block's public fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub identity: String,
    pub previous_identity: String,
    pub capacity: usize,
    pub weight: usize,
    pub height: usize,
    pub merkle_root: Option<String>,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// `hex(SHA-256(now || hex(salt)))` with a salt from the OS random source.
fn derive_identity() -> Result<String, BlockError> {
    let mut salt = [0u8; IDENTITY_SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(BlockError::Identity)?;

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
    let preimage = format!("{}{}", now, hex::encode(salt));
    Ok(sha256_hex(preimage.as_bytes()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLOCK_CAPACITY, HEX_DIGEST_LENGTH};
    use crate::crypto::hash::double_sha256_hex;

    fn leaf(content: &str) -> Node {
        Node::new_root().with_content(content.as_bytes().to_vec())
    }

    fn sized_leaf(size: usize) -> Node {
        Node::new_root().with_content(vec![0xAB; size])
    }

    fn small_block(capacity: usize) -> Block {
        Block::root_with_config(BlockConfig::with_capacity(capacity)).unwrap()
    }

    #[test]
    fn root_block_properties() {
        let block = Block::new_root().unwrap();
        assert!(block.is_root());
        assert_eq!(block.previous_identity(), "");
        assert_eq!(block.capacity(), BLOCK_CAPACITY);
        assert_eq!(block.identity().len(), HEX_DIGEST_LENGTH);
        assert_eq!(block.weight(), 0);
        assert_eq!(block.height(), 0);
        assert!(block.merkle_root().is_none());
        assert!(!block.is_sealed());
    }

    #[test]
    fn chained_block_stores_previous_verbatim() {
        let root = Block::new_root().unwrap();
        let next = Block::new(root.identity()).unwrap();
        assert_eq!(next.previous_identity(), root.identity());
        assert!(!next.is_root());
    }

    #[test]
    fn chained_block_requires_predecessor() {
        let err = Block::new("").unwrap_err();
        assert!(matches!(err, BlockError::EmptyPredecessor));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Block::root_with_config(BlockConfig::with_capacity(0)).unwrap_err();
        assert!(matches!(err, BlockError::InvalidCapacity));
    }

    #[test]
    fn identities_are_unique() {
        let a = Block::new_root().unwrap();
        let b = Block::new_root().unwrap();
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn weight_is_exact_sum_of_sizes() {
        let block = small_block(10_000);
        let sizes = [3usize, 0, 17, 250, 1, 42];
        for size in sizes {
            block.add_node(sized_leaf(size)).unwrap();
        }
        assert_eq!(block.weight(), sizes.iter().sum::<usize>());
        assert_eq!(block.height(), sizes.len());
        assert_eq!(block.remaining(), 10_000 - block.weight());
    }

    #[test]
    fn oversized_leaf_rejected_on_empty_block() {
        let block = small_block(10);
        let err = block.add_node(sized_leaf(11)).unwrap_err();
        assert!(matches!(
            err,
            BlockError::LeafTooLarge {
                size: 11,
                capacity: 10
            }
        ));
        assert_eq!(block.height(), 0);
    }

    #[test]
    fn append_reaching_capacity_rejected() {
        let block = small_block(10);
        block.add_node(sized_leaf(4)).unwrap();
        let err = block.add_node(sized_leaf(6)).unwrap_err();
        assert!(matches!(
            err,
            BlockError::CapacityExceeded {
                weight: 4,
                size: 6,
                capacity: 10
            }
        ));
        assert_eq!(block.weight(), 4);
        assert_eq!(block.height(), 1);
    }

    #[test]
    fn append_up_to_capacity_minus_one_accepted() {
        let block = small_block(10);
        block.add_node(sized_leaf(4)).unwrap();
        block.add_node(sized_leaf(5)).unwrap();
        assert_eq!(block.weight(), 9);

        // Even an empty leaf is refused once the next byte would fill the block.
        block.add_node(sized_leaf(0)).unwrap();
        let err = block.add_node(sized_leaf(1)).unwrap_err();
        assert!(err.is_capacity_exhausted());
    }

    #[test]
    fn leaf_of_exactly_capacity_is_capacity_error() {
        let block = small_block(8);
        let err = block.add_node(sized_leaf(8)).unwrap_err();
        assert!(matches!(err, BlockError::CapacityExceeded { .. }));
    }

    #[test]
    fn offer_returns_rejected_leaf() {
        let block = small_block(10);
        let big = sized_leaf(12);
        let (err, returned) = block.offer(big.clone()).unwrap_err();
        assert!(matches!(err, BlockError::LeafTooLarge { .. }));
        assert_eq!(returned, big);
    }

    #[test]
    fn add_nodes_keeps_partial_progress() {
        let block = small_block(10);
        let batch = vec![sized_leaf(3), sized_leaf(3), sized_leaf(5), sized_leaf(1)];
        let err = block.add_nodes(batch).unwrap_err();
        assert!(matches!(err, BlockError::CapacityExceeded { weight: 6, .. }));
        assert_eq!(block.height(), 2);
        assert_eq!(block.weight(), 6);
    }

    #[test]
    fn add_nodes_appends_in_order() {
        let block = small_block(1_000);
        block
            .add_nodes(vec![leaf("a"), leaf("b"), leaf("c")])
            .unwrap();
        let contents: Vec<Vec<u8>> = block.leaves().iter().map(|n| n.content().to_vec()).collect();
        assert_eq!(contents, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn build_empty_block_fails_without_touching_root() {
        let block = small_block(100);
        let err = block.build().unwrap_err();
        assert!(matches!(err, BlockError::EmptyBlock));
        assert!(block.merkle_root().is_none());
    }

    #[test]
    fn build_pads_odd_leaf_count() {
        let odd = small_block(1_000);
        odd.add_nodes(vec![leaf("a"), leaf("b"), leaf("c")]).unwrap();

        let even = small_block(1_000);
        even.add_nodes(vec![leaf("a"), leaf("b"), leaf("c"), Node::padding()])
            .unwrap();

        assert_eq!(odd.build().unwrap(), even.build().unwrap());
        // Padding is not stored.
        assert_eq!(odd.height(), 3);
    }

    #[test]
    fn build_two_leaves_root_is_pair_digest() {
        let block = small_block(1_000);
        block.add_nodes(vec![leaf("a"), leaf("b")]).unwrap();
        assert_eq!(block.build().unwrap(), double_sha256_hex(b"ab"));
    }

    #[test]
    fn rebuild_is_stable() {
        let block = small_block(1_000);
        block.add_nodes(vec![leaf("a"), leaf("b"), leaf("c")]).unwrap();
        let first = block.build().unwrap();
        let copy = block.clone();
        assert_eq!(block.build().unwrap(), first);
        assert_eq!(copy.build().unwrap(), first);
        assert_eq!(copy.identity(), block.identity());
    }

    #[test]
    fn verify_is_string_equality() {
        let block = small_block(1_000);
        block.add_nodes(vec![leaf("a"), leaf("b"), leaf("c")]).unwrap();
        assert!(!block.verify(""));

        let root = block.build().unwrap();
        assert!(block.verify(&root));
        assert!(!block.verify(&root.to_uppercase()));
        assert!(!block.verify(""));

        let overlap = small_block(1_000);
        overlap.add_nodes(vec![leaf("a"), leaf("b")]).unwrap();
        let other = overlap.build().unwrap();
        assert!(!block.verify(&other));
    }

    #[test]
    fn sealed_block_rejects_appends() {
        let block = small_block(1_000);
        block.add_node(leaf("a")).unwrap();
        block.build().unwrap();
        let err = block.add_node(leaf("b")).unwrap_err();
        assert!(matches!(err, BlockError::Sealed { .. }));
        assert_eq!(block.height(), 1);
    }

    #[test]
    fn audit_recomputes_root() {
        let block = small_block(1_000);
        assert!(!block.audit());
        block.add_nodes(vec![leaf("x"), leaf("y"), leaf("z")]).unwrap();
        block.build().unwrap();
        assert!(block.audit());
    }

    #[test]
    fn get_node_finds_by_identity() {
        let block = small_block(1_000);
        let b = leaf("b");
        let id = b.identity().unwrap().to_string();
        block.add_nodes(vec![leaf("a"), b.clone(), leaf("c")]).unwrap();

        assert_eq!(block.get_node(&id), Some(b));
        assert_eq!(block.get_node("missing"), None);
    }

    #[test]
    fn root_node_is_first_leaf() {
        let block = small_block(1_000);
        assert!(block.root_node().is_none());
        block.add_nodes(vec![leaf("first"), leaf("second")]).unwrap();
        assert_eq!(block.root_node(), Some(leaf("first")));
    }

    #[test]
    fn container_trait_dispatch() {
        fn fill(container: &dyn Container) -> Result<(), BlockError> {
            container.add_node(leaf("a"))?;
            container.add_nodes(vec![leaf("b")])
        }

        let block = small_block(1_000);
        fill(&block).unwrap();
        let root = block.build().unwrap();
        let container: &dyn Container = &block;
        assert!(container.verify(&root));
        assert!(container.get_node(leaf("a").identity().unwrap()).is_some());
    }

    #[test]
    fn summary_serialization_roundtrip() {
        let block = small_block(1_000);
        block.add_node(leaf("a")).unwrap();
        block.build().unwrap();

        let summary = block.summary();
        assert_eq!(summary.height, 1);
        assert_eq!(summary.merkle_root, block.merkle_root());

        let json = serde_json::to_string(&summary).expect("serialize");
        let recovered: BlockSummary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(summary, recovered);
    }
}
