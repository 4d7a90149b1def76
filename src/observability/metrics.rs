//! Metrics for the data-quality engine.
//!
//! Counter names follow Prometheus conventions. Recording is a no-op until
//! the embedding application installs a recorder; the engine itself never
//! owns an exporter.

/// Enum representing all metric names used in the engine.
/// This eliminates magic strings and provides compile-time safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Blocking metrics
    BlockingBlocksBuilt,
    BlockingMalformedRows,

    // Clustering metrics
    ClusteringPairsScored,
    ClusteringClustersFound,

    // Validation metrics
    ValidationFlagsRaised,

    // Engine metrics
    EngineRunsCompleted,
    EngineRecordsProcessed,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::BlockingBlocksBuilt => "provider_dq_blocking_blocks_built_total",
            MetricName::BlockingMalformedRows => "provider_dq_blocking_malformed_rows_total",
            MetricName::ClusteringPairsScored => "provider_dq_clustering_pairs_scored_total",
            MetricName::ClusteringClustersFound => "provider_dq_clustering_clusters_found_total",
            MetricName::ValidationFlagsRaised => "provider_dq_validation_flags_raised_total",
            MetricName::EngineRunsCompleted => "provider_dq_engine_runs_completed_total",
            MetricName::EngineRecordsProcessed => "provider_dq_engine_records_processed_total",
        }
    }
}

pub mod blocking {
    use super::MetricName;

    pub fn blocks_built(count: usize) {
        ::metrics::counter!(MetricName::BlockingBlocksBuilt.as_str()).increment(count as u64);
    }

    pub fn malformed_rows(count: usize) {
        ::metrics::counter!(MetricName::BlockingMalformedRows.as_str()).increment(count as u64);
    }
}

pub mod clustering {
    use super::MetricName;

    pub fn pairs_scored(count: usize) {
        ::metrics::counter!(MetricName::ClusteringPairsScored.as_str()).increment(count as u64);
    }

    pub fn clusters_found(count: usize) {
        ::metrics::counter!(MetricName::ClusteringClustersFound.as_str()).increment(count as u64);
    }
}

pub mod validation {
    use super::MetricName;

    pub fn flag_raised(kind: &str) {
        ::metrics::counter!(
            MetricName::ValidationFlagsRaised.as_str(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }
}

pub mod engine {
    use super::MetricName;

    pub fn run_completed() {
        ::metrics::counter!(MetricName::EngineRunsCompleted.as_str()).increment(1);
    }

    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::EngineRecordsProcessed.as_str()).increment(count as u64);
    }
}
