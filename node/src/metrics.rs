//! # Prometheus Metrics
//!
//! Operational counters for a producer run. Rendered in the Prometheus text
//! exposition format when `run --metrics` is passed, so a run can be
//! scraped by a pushgateway or diffed between runs.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] under
//! the `sapphire` namespace so they do not collide with any default global
//! registry consumers.

use prometheus::core::Collector;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

/// Holds all Prometheus metric handles for the producer.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Leaves accepted by some block.
    pub leaves_appended_total: IntCounter,
    /// Leaves refused because they can never fit in a block.
    pub leaves_rejected_total: IntCounter,
    /// Blocks sealed with a Merkle root.
    pub blocks_built_total: IntCounter,
    /// Times the tip was full and a new block was opened.
    pub block_rotations_total: IntCounter,
    /// Blocks currently in the chain.
    pub chain_length: IntGauge,
    /// Encoded size of each appended leaf.
    pub leaf_size_bytes: Histogram,
    /// Wall time of a single append, rotation included.
    pub append_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once per run.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("sapphire".into()), None)?;

        let leaves_appended_total = register(
            &registry,
            IntCounter::new("leaves_appended_total", "Leaves accepted into a block")?,
        )?;
        let leaves_rejected_total = register(
            &registry,
            IntCounter::new(
                "leaves_rejected_total",
                "Leaves larger than the block capacity",
            )?,
        )?;
        let blocks_built_total = register(
            &registry,
            IntCounter::new("blocks_built_total", "Blocks sealed with a Merkle root")?,
        )?;
        let block_rotations_total = register(
            &registry,
            IntCounter::new(
                "block_rotations_total",
                "Times a full tip was sealed and replaced",
            )?,
        )?;
        let chain_length = register(
            &registry,
            IntGauge::new("chain_length", "Number of blocks in the chain")?,
        )?;
        let leaf_size_bytes = register(
            &registry,
            Histogram::with_opts(
                HistogramOpts::new("leaf_size_bytes", "Encoded leaf payload size in bytes")
                    .buckets(prometheus::exponential_buckets(64.0, 2.0, 12)?),
            )?,
        )?;
        let append_latency_seconds = register(
            &registry,
            Histogram::with_opts(
                HistogramOpts::new(
                    "append_latency_seconds",
                    "Latency of a single chain append in seconds",
                )
                .buckets(vec![
                    0.000_001, 0.000_005, 0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005,
                    0.01, 0.05, 0.1,
                ]),
            )?,
        )?;

        Ok(Self {
            registry,
            leaves_appended_total,
            leaves_rejected_total,
            blocks_built_total,
            block_rotations_total,
            chain_length,
            leaf_size_bytes,
            append_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}
