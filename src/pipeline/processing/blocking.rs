//! Candidate blocking for the deduplication pipeline.
//!
//! Full pairwise comparison over n roster records is O(n²); blocking bounds
//! the similarity scorer to pairs that already share a cheap exact key
//! (normalized surname + primary specialty). The trade-off is a small
//! false-negative risk: true duplicates with divergent surname spellings or
//! specialty coding are never compared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::ProviderRecord;
use crate::pipeline::processing::normalize::normalize;

/// The exact key a record is bucketed under for candidate comparison.
///
/// Records missing a surname or specialty cannot participate in blocking;
/// they are isolated into per-record keys instead of being silently merged
/// into a shared catch-all bucket, so they are never compared against
/// anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKey {
    Name { last_name: String, specialty: String },
    Isolated { record_id: String },
}

/// Roster records partitioned by [`BlockKey`].
///
/// Each record belongs to exactly one block. Block iteration order is
/// deterministic (sorted by key) so downstream cluster output is stable
/// across runs.
#[derive(Debug, Clone, Default)]
pub struct BlockingIndex {
    blocks: BTreeMap<BlockKey, Vec<String>>,
    malformed_rows: usize,
}

impl BlockingIndex {
    /// Partition the roster by (normalized last name, normalized specialty).
    pub fn build(records: &[ProviderRecord]) -> Self {
        let mut blocks: BTreeMap<BlockKey, Vec<String>> = BTreeMap::new();
        let mut malformed_rows = 0;

        for record in records {
            let last_name = normalize(&record.last_name);
            let specialty = normalize(&record.primary_specialty);

            let key = if last_name.is_empty() || specialty.is_empty() {
                malformed_rows += 1;
                debug!(record_id = %record.record_id, "isolating record with missing blocking fields");
                BlockKey::Isolated {
                    record_id: record.record_id.clone(),
                }
            } else {
                BlockKey::Name {
                    last_name,
                    specialty,
                }
            };

            blocks.entry(key).or_default().push(record.record_id.clone());
        }

        crate::observability::metrics::blocking::blocks_built(blocks.len());
        crate::observability::metrics::blocking::malformed_rows(malformed_rows);

        Self {
            blocks,
            malformed_rows,
        }
    }

    /// All blocks, in deterministic key order.
    pub fn blocks(&self) -> impl Iterator<Item = (&BlockKey, &[String])> {
        self.blocks.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Blocks with at least two members, the only ones worth scoring.
    pub fn comparable_blocks(&self) -> impl Iterator<Item = (&BlockKey, &[String])> {
        self.blocks().filter(|(_, members)| members.len() >= 2)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Rows isolated because a blocking field was missing. Surfaced to the
    /// caller rather than aborting the run.
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }
}
