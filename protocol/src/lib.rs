// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sapphire Core Library
//!
//! Sapphire groups an append-only stream of immutable leaf records into
//! fixed-capacity blocks, and commits to each block's exact leaves, in
//! order, with a single Merkle root. Change one byte of one leaf, or swap
//! two leaves, and the root no longer verifies.
//!
//! ## Architecture
//!
//! - **crypto** - SHA-256 and double SHA-256, hex-encoded.
//! - **storage** - Leaf records, blocks, the Merkle builder, and chains.
//! - **config** - Block budget and digest constants.
//!
//! ## Quick Tour
//!
//! ```
//! use sapphire_protocol::storage::{Block, Node};
//!
//! let block = Block::new_root().unwrap();
//!
//! let mut leaf = Node::new_root();
//! leaf.add_content(&("sensor-7", 21.5f64)).unwrap();
//! block.add_node(leaf).unwrap();
//!
//! let root = block.build().unwrap();
//! assert!(block.verify(&root));
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Every fallible operation returns a `Result`. Nothing panics on bad input.
//! 2. Nothing is retried internally. Rotation policy belongs to the caller
//!    (or to [`storage::Chain`], which is one such caller).
//! 3. One lock per block, never a global one.

pub mod config;
pub mod crypto;
pub mod storage;
