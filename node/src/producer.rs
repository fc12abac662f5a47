//! # Block Production Loop
//!
//! Turns a stream of payloads into linked leaves and feeds them to a
//! [`Chain`]. The first accepted leaf is a root leaf; every later leaf names
//! the identity of the last leaf that was *accepted*. A leaf that no block
//! can hold is logged, counted, and skipped without advancing that link.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use sapphire_protocol::storage::{Chain, Node};

use crate::metrics::NodeMetrics;

/// Progress is logged every this many records.
const PROGRESS_INTERVAL: u64 = 1_000;

/// Outcome of a production run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProduceStats {
    pub appended: u64,
    pub rejected: u64,
}

/// Encode `records` payloads drawn from `next_payload` and append them to
/// `chain`.
///
/// # Errors
///
/// Encoding failures and any append error other than an unplaceable leaf.
pub fn produce<T, F>(
    chain: &mut Chain,
    records: u64,
    metrics: &NodeMetrics,
    mut next_payload: F,
) -> Result<ProduceStats>
where
    T: Serialize,
    F: FnMut() -> T,
{
    let mut stats = ProduceStats::default();
    let mut previous: Option<String> = None;

    for sequence in 0..records {
        let mut node = match &previous {
            None => Node::new_root(),
            Some(identity) => Node::new(identity.clone()),
        };
        node.add_content(&next_payload())
            .with_context(|| format!("failed to encode record {}", sequence))?;

        let identity = node.identity().map(str::to_owned);
        let size = node.size();

        let timer = Instant::now();
        match chain.append(node) {
            Ok(placement) => {
                metrics
                    .append_latency_seconds
                    .observe(timer.elapsed().as_secs_f64());
                metrics.leaves_appended_total.inc();
                metrics.leaf_size_bytes.observe(size as f64);
                if placement.rotated {
                    metrics.block_rotations_total.inc();
                }
                stats.appended += 1;
                previous = identity;
            }
            Err(e) if e.is_unplaceable() => {
                tracing::warn!(sequence, size, error = %e, "record skipped");
                metrics.leaves_rejected_total.inc();
                stats.rejected += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to append record {}", sequence));
            }
        }
        metrics.chain_length.set(chain.len() as i64);

        if (sequence + 1) % PROGRESS_INTERVAL == 0 {
            tracing::debug!(
                appended = stats.appended,
                rejected = stats.rejected,
                blocks = chain.len(),
                "progress"
            );
        }
    }

    Ok(stats)
}

/// Build the tip if it holds any leaves, then count every sealed block.
///
/// Returns the tip's root, or `None` when the tip was left empty.
pub fn seal_tip(chain: &Chain, metrics: &NodeMetrics) -> Result<Option<String>> {
    let root = if chain.tip().height() > 0 {
        let root = chain.seal().context("failed to seal final block")?;
        tracing::info!(identity = %chain.tip().identity(), root = %root, "final block sealed");
        Some(root)
    } else {
        None
    };

    let sealed = chain.blocks().iter().filter(|b| b.is_sealed()).count();
    metrics.blocks_built_total.inc_by(sealed as u64);
    Ok(root)
}
