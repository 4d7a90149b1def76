//! Caller-owned report caching.
//!
//! The engine recomputes from scratch on every invocation; any caching
//! lives with the caller. The cache key must cover everything that affects
//! output: the dataset snapshot fingerprint, the similarity threshold, and
//! the cutoff date. A key missing any of those serves stale results.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::pipeline::engine::{QualityReport, RosterDatasets};

/// Cache key covering all parameters that affect a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Compute the key for one (datasets, config) pair.
    pub fn compute(datasets: &RosterDatasets, config: &EngineConfig) -> Result<Self> {
        let mut s = String::new();
        s.push_str(&dataset_fingerprint(datasets)?);
        s.push('|');
        s.push_str(&config.similarity_threshold.to_string());
        s.push('|');
        s.push_str(&config.cutoff_date.to_string());

        let mut hasher = Sha256::new();
        hasher.update(s.as_bytes());
        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sha256 fingerprint over the four loaded datasets, in load order.
fn dataset_fingerprint(datasets: &RosterDatasets) -> Result<String> {
    let mut hasher = Sha256::new();

    hasher.update(serde_json::to_vec(&datasets.roster)?);
    hasher.update(serde_json::to_vec(&datasets.ca_licenses)?);
    hasher.update(serde_json::to_vec(&datasets.ny_licenses)?);
    hasher.update(serde_json::to_vec(&datasets.npi_registry)?);

    Ok(hex::encode(hasher.finalize()))
}

/// A plain in-memory report cache for embedding applications.
#[derive(Debug, Default)]
pub struct ReportCache {
    reports: HashMap<CacheKey, QualityReport>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&QualityReport> {
        self.reports.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, report: QualityReport) {
        self.reports.insert(key, report);
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::pipeline::engine::RosterDatasets;

    #[test]
    fn test_key_stable_for_same_inputs() {
        let datasets = RosterDatasets::default();
        let config = EngineConfig::default();

        let a = CacheKey::compute(&datasets, &config).unwrap();
        let b = CacheKey::compute(&datasets, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_changes_with_threshold() {
        let datasets = RosterDatasets::default();

        let a = CacheKey::compute(&datasets, &EngineConfig::new(90, "2025-09-07").unwrap()).unwrap();
        let b = CacheKey::compute(&datasets, &EngineConfig::new(80, "2025-09-07").unwrap()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_changes_with_cutoff_date() {
        let datasets = RosterDatasets::default();

        let a = CacheKey::compute(&datasets, &EngineConfig::new(90, "2025-09-07").unwrap()).unwrap();
        let b = CacheKey::compute(&datasets, &EngineConfig::new(90, "2025-09-08").unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
