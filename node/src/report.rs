//! # Run Report
//!
//! Summarizes a producer run: how many records were generated, how many
//! were rejected, and the sealed state of every block in the chain. The
//! report goes to stdout either as aligned text or as a single JSON
//! document.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use sapphire_protocol::storage::{BlockSummary, Chain};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per block, for terminals.
    Text,
    /// A single JSON object, for piping.
    Json,
}

/// One block as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    #[serde(flatten)]
    pub summary: BlockSummary,
    /// Whether the stored root still matches the leaves.
    pub verified: bool,
}

/// Outcome of a single `run` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub records: u64,
    pub rejected: u64,
    pub links_verified: bool,
    pub blocks: Vec<BlockReport>,
}

impl RunReport {
    /// Snapshot `chain` after a run that started at `started_at`.
    pub fn from_chain(
        chain: &Chain,
        started_at: DateTime<Utc>,
        records: u64,
        rejected: u64,
    ) -> Self {
        let finished_at = Utc::now();
        let elapsed_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        let blocks = chain
            .blocks()
            .iter()
            .map(|block| BlockReport {
                summary: block.summary(),
                verified: block.audit(),
            })
            .collect();

        Self {
            started_at,
            finished_at,
            elapsed_ms,
            records,
            rejected,
            links_verified: chain.verify_links(),
            blocks,
        }
    }

    /// Total leaves across every reported block.
    pub fn leaves(&self) -> usize {
        self.blocks.iter().map(|b| b.summary.height).sum()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "records: {}  rejected: {}  leaves: {}  blocks: {}  elapsed: {}ms\n",
            self.records,
            self.rejected,
            self.leaves(),
            self.blocks.len(),
            self.elapsed_ms
        ));
        out.push_str(&format!("links verified: {}\n", self.links_verified));

        for (index, block) in self.blocks.iter().enumerate() {
            let s = &block.summary;
            out.push_str(&format!(
                "#{:<4} {}  height={:<8} weight={:<12} root={}  verified={}\n",
                index,
                s.identity,
                s.height,
                s.weight,
                s.merkle_root.as_deref().unwrap_or("-"),
                block.verified
            ));
        }
        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
