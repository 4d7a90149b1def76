//! Full-pipeline orchestration: normalize → block → cluster, plus the
//! row-level validation checks, over one in-memory dataset snapshot.
//!
//! Everything runs single-threaded and to completion; the engine holds no
//! state between runs and never mutates its inputs. Callers that cache
//! reports key them by [`CacheKey`](crate::cache::CacheKey).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cache::CacheKey;
use crate::config::EngineConfig;
use crate::domain::{DuplicateCluster, FlagKind, NpiRow, ProviderRecord, StateLicenseRow, ValidationFlag};
use crate::error::Result;
use crate::pipeline::processing::blocking::BlockingIndex;
use crate::pipeline::processing::clustering::ClusterBuilder;
use crate::pipeline::processing::similarity::{Similarity, TokenSetSimilarity};
use crate::pipeline::processing::validation::{run_checks, LicenseReference};

/// The four tabular inputs, already loaded as typed rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterDatasets {
    pub roster: Vec<ProviderRecord>,
    pub ca_licenses: Vec<StateLicenseRow>,
    pub ny_licenses: Vec<StateLicenseRow>,
    pub npi_registry: Vec<NpiRow>,
}

/// Aggregate flag counts for KPI summaries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlagCounts {
    pub expired_license: usize,
    pub invalid_license: usize,
    pub missing_npi: usize,
    pub malformed_phone: usize,
}

impl FlagCounts {
    pub fn tally(flags: &[ValidationFlag]) -> Self {
        let mut counts = Self::default();
        for flag in flags {
            match flag.kind {
                FlagKind::ExpiredLicense => counts.expired_license += 1,
                FlagKind::InvalidLicense => counts.invalid_license += 1,
                FlagKind::MissingNpi => counts.missing_npi += 1,
                FlagKind::MalformedPhone => counts.malformed_phone += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.expired_license + self.invalid_license + self.missing_npi + self.malformed_phone
    }
}

/// Output of one engine run; discarded when the caller is done with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub cache_key: CacheKey,
    pub total_providers: usize,
    pub clusters: Vec<DuplicateCluster>,
    /// Records appearing in any duplicate cluster.
    pub duplicate_records: usize,
    pub flags: Vec<ValidationFlag>,
    pub flag_counts: FlagCounts,
    /// Rows isolated from blocking because a key field was missing.
    pub malformed_rows: usize,
    /// Overall score: four checks per provider, issues deducted.
    pub quality_score: f64,
}

impl QualityReport {
    /// Total issue count feeding the quality score.
    pub fn total_issues(&self) -> usize {
        self.flag_counts.total() + self.duplicate_records
    }
}

/// The data-quality engine. Construct once per configuration; each `run`
/// evaluates one dataset snapshot cold.
pub struct QualityEngine {
    config: EngineConfig,
    cluster_builder: ClusterBuilder,
}

impl QualityEngine {
    pub fn new(config: EngineConfig, scorer: Box<dyn Similarity + Send + Sync>) -> Result<Self> {
        config.validate()?;
        let cluster_builder = ClusterBuilder::new(scorer, config.similarity_threshold);
        Ok(Self {
            config,
            cluster_builder,
        })
    }

    /// Engine with the default token-set scorer.
    pub fn with_default_scorer(config: EngineConfig) -> Result<Self> {
        Self::new(config, Box::new(TokenSetSimilarity::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline over one snapshot.
    pub fn run(&self, datasets: &RosterDatasets) -> Result<QualityReport> {
        let cache_key = CacheKey::compute(datasets, &self.config)?;
        let total_providers = datasets.roster.len();
        info!(
            total_providers,
            threshold = self.config.similarity_threshold,
            cutoff = %self.config.cutoff_date,
            "starting data-quality run"
        );

        // Deduplication: block, then cluster within blocks
        let index = BlockingIndex::build(&datasets.roster);
        let clusters = self.cluster_builder.build_clusters(&index, &datasets.roster);
        let duplicate_records: usize = clusters.iter().map(DuplicateCluster::len).sum();

        // Independent row-level checks against the reference tables
        let mut reference = LicenseReference::new();
        reference.insert_table(crate::domain::LicenseState::Ca, datasets.ca_licenses.clone());
        reference.insert_table(crate::domain::LicenseState::Ny, datasets.ny_licenses.clone());
        let flags = run_checks(&datasets.roster, &reference, self.config.cutoff_date);
        let flag_counts = FlagCounts::tally(&flags);

        let quality_score =
            quality_score(total_providers, flag_counts.total() + duplicate_records);

        info!(
            clusters = clusters.len(),
            duplicate_records,
            flags = flags.len(),
            malformed_rows = index.malformed_rows(),
            quality_score,
            "data-quality run finished"
        );
        crate::observability::metrics::engine::records_processed(total_providers);
        crate::observability::metrics::engine::run_completed();

        Ok(QualityReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            cache_key,
            total_providers,
            clusters,
            duplicate_records,
            flags,
            flag_counts,
            malformed_rows: index.malformed_rows(),
            quality_score,
        })
    }
}

/// KPI formula: four checked aspects per provider (phone, NPI, license,
/// uniqueness), one point deducted per issue found.
fn quality_score(total_providers: usize, total_issues: usize) -> f64 {
    let fields_checked = (total_providers * 4) as f64;
    if fields_checked == 0.0 {
        return 0.0;
    }
    ((fields_checked - total_issues as f64) / fields_checked * 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LicenseState;
    use crate::pipeline::processing::normalize::normalize;
    use chrono::NaiveDate;

    fn provider(id: &str, full_name: &str, last_name: &str, specialty: &str) -> ProviderRecord {
        ProviderRecord {
            record_id: id.to_string(),
            full_name: full_name.to_string(),
            normalized_name: normalize(full_name),
            last_name: last_name.to_string(),
            primary_specialty: specialty.to_string(),
            npi: Some("1234567890".to_string()),
            phone: "(555) 123-4567".to_string(),
            license_state: Some(LicenseState::Ca),
            license_number: Some("A100".to_string()),
            license_expiry: None,
        }
    }

    fn datasets() -> RosterDatasets {
        RosterDatasets {
            roster: vec![
                provider("P1", "Dave Shah", "Shah", "Cardiology"),
                provider("P2", "David H Shah", "Shah", "Cardiology"),
                provider("P3", "Maria Lopez", "Lopez", "Oncology"),
            ],
            ca_licenses: vec![StateLicenseRow {
                license_number: "A100".to_string(),
                status: "active".to_string(),
                expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            }],
            ny_licenses: Vec::new(),
            npi_registry: Vec::new(),
        }
    }

    #[test]
    fn test_full_run_reports_duplicates_and_flags() {
        let engine =
            QualityEngine::with_default_scorer(EngineConfig::new(80, "2025-09-07").unwrap())
                .unwrap();
        let report = engine.run(&datasets()).unwrap();

        assert_eq!(report.total_providers, 3);
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].members, vec!["P1", "P2"]);
        assert_eq!(report.duplicate_records, 2);
        // Clean roster otherwise: no validation flags
        assert_eq!(report.flag_counts.total(), 0);
        assert_eq!(report.malformed_rows, 0);
    }

    #[test]
    fn test_repeated_runs_are_deterministic() {
        let engine =
            QualityEngine::with_default_scorer(EngineConfig::new(80, "2025-09-07").unwrap())
                .unwrap();
        let data = datasets();

        let first = engine.run(&data).unwrap();
        let second = engine.run(&data).unwrap();

        assert_eq!(first.clusters, second.clusters);
        assert_eq!(first.flag_counts, second.flag_counts);
        assert_eq!(first.cache_key, second.cache_key);
    }

    #[test]
    fn test_quality_score_formula() {
        assert_eq!(quality_score(0, 0), 0.0);
        assert_eq!(quality_score(10, 0), 100.0);
        // 10 providers, 4 issues: 36/40
        assert!((quality_score(10, 4) - 90.0).abs() < f64::EPSILON);
        // Pathological issue counts clamp at zero
        assert_eq!(quality_score(1, 100), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let config = EngineConfig {
            similarity_threshold: 150,
            cutoff_date: NaiveDate::from_ymd_opt(2025, 9, 7).unwrap(),
        };
        assert!(QualityEngine::with_default_scorer(config).is_err());
    }
}
