//! Walkthrough of the Sapphire block lifecycle.
//!
//! Encodes a handful of readings into linked leaves, fills a small block
//! until it refuses more, seals it, rotates into a chained block, and then
//! shows that tampering with a single leaf changes the Merkle root.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use serde::Serialize;

use sapphire_protocol::config::BlockConfig;
use sapphire_protocol::storage::{Block, BlockError, Chain, Node};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(title: &str) {
    println!();
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{DIM}  {}{RESET}", "-".repeat(title.len()));
}

fn step(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn ok(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn refused(text: &str) {
    println!("{RED}  [NO] {text}{RESET}");
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

#[derive(Serialize)]
struct Reading<'a> {
    station: &'a str,
    sequence: u32,
    celsius: f32,
}

fn leaf(previous: Option<&str>, sequence: u32) -> Result<Node, Box<dyn std::error::Error>> {
    let mut node = match previous {
        None => Node::new_root(),
        Some(id) => Node::new(id),
    };
    node.add_content(&Reading {
        station: "harbor-east",
        sequence,
        celsius: 14.0 + sequence as f32 * 0.5,
    })?;
    Ok(node)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("{BOLD}{CYAN}  SAPPHIRE  --  Block Lifecycle Demo{RESET}");

    // ---- 1. Leaves ----
    section("1. Content-addressed leaves");
    let first = leaf(None, 0)?;
    let second = leaf(first.identity(), 1)?;
    field("leaf 0 identity", first.identity().unwrap_or("-"));
    field("leaf 1 identity", second.identity().unwrap_or("-"));
    field("leaf 1 predecessor", second.predecessor());
    ok("leaf 1 names leaf 0");

    // ---- 2. Fill a block ----
    section("2. Filling a block");
    let capacity = first.size() * 4;
    let block = Block::root_with_config(BlockConfig::with_capacity(capacity))?;
    field("block identity", block.identity());
    field("capacity (bytes)", capacity);

    let mut previous = second.identity().map(str::to_owned);
    block.add_node(first)?;
    block.add_node(second)?;
    let mut sequence = 2;
    loop {
        let next = leaf(previous.as_deref(), sequence)?;
        let id = next.identity().map(str::to_owned);
        match block.add_node(next) {
            Ok(()) => {
                step(&format!("leaf {sequence} appended, weight {}", block.weight()));
                previous = id;
                sequence += 1;
            }
            Err(err @ BlockError::CapacityExceeded { .. }) => {
                refused(&err.to_string());
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    // ---- 3. Seal ----
    section("3. Sealing");
    let start = Instant::now();
    let root = block.build()?;
    field("merkle root", &root);
    field("height", block.height());
    println!("{DIM}  [build: {:.3} ms]{RESET}", start.elapsed().as_secs_f64() * 1e3);
    if block.verify(&root) && block.audit() {
        ok("root verifies against the leaves");
    }

    // ---- 4. Chain ----
    section("4. Rotating through a chain");
    let mut chain = Chain::with_config(BlockConfig::with_capacity(capacity))?;
    let mut previous: Option<String> = None;
    for sequence in 0..12 {
        let node = leaf(previous.as_deref(), sequence)?;
        previous = node.identity().map(str::to_owned);
        let placement = chain.append(node)?;
        if placement.rotated {
            step(&format!("tip full, leaf {sequence} opened block {}", placement.block_index));
        }
    }
    chain.seal()?;
    for summary in chain.summaries() {
        field(
            &format!("block {:.12}", summary.identity),
            format!(
                "{} leaves, root {:.16}",
                summary.height,
                summary.merkle_root.unwrap_or_default()
            ),
        );
    }
    if chain.verify_links() {
        ok("every block names its predecessor");
    }

    // ---- 5. Tamper ----
    section("5. Tampering");
    let mut leaves = block.leaves();
    let mut altered = leaves[1].content().to_vec();
    altered[0] ^= 0xff;
    leaves[1].set_content(altered);

    let forged = Block::root_with_config(BlockConfig::with_capacity(capacity))?;
    forged.add_nodes(leaves)?;
    let forged_root = forged.build()?;
    field("forged root", &forged_root);
    if !block.verify(&forged_root) {
        refused("forged root does not match the sealed block");
    }

    println!();
    Ok(())
}
