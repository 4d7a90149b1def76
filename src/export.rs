//! CSV report export.
//!
//! Flags and clusters are joined back to full provider detail so the
//! written reports stand alone for review.

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::domain::ProviderRecord;
use crate::error::Result;
use crate::pipeline::engine::QualityReport;

/// Write validation flags joined to provider detail.
pub fn write_flag_report(
    path: &Path,
    roster: &[ProviderRecord],
    report: &QualityReport,
) -> Result<()> {
    let by_id = index_roster(roster);
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "record_id",
        "full_name",
        "primary_specialty",
        "flag",
        "detail",
    ])?;

    for flag in &report.flags {
        let record = by_id.get(flag.record_id.as_str());
        writer.write_record([
            flag.record_id.as_str(),
            record.map_or("", |r| r.full_name.as_str()),
            record.map_or("", |r| r.primary_specialty.as_str()),
            flag.kind.as_str(),
            flag.detail.as_str(),
        ])?;
    }

    writer.flush()?;
    info!(path = %path.display(), flags = report.flags.len(), "wrote flag report");
    Ok(())
}

/// Write duplicate clusters, one row per member, joined to provider detail.
pub fn write_cluster_report(
    path: &Path,
    roster: &[ProviderRecord],
    report: &QualityReport,
) -> Result<()> {
    let by_id = index_roster(roster);
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "cluster",
        "record_id",
        "full_name",
        "primary_specialty",
        "npi",
        "phone",
    ])?;

    for (cluster_number, cluster) in report.clusters.iter().enumerate() {
        for member in &cluster.members {
            let record = by_id.get(member.as_str());
            writer.write_record([
                (cluster_number + 1).to_string().as_str(),
                member.as_str(),
                record.map_or("", |r| r.full_name.as_str()),
                record.map_or("", |r| r.primary_specialty.as_str()),
                record.and_then(|r| r.npi.as_deref()).unwrap_or(""),
                record.map_or("", |r| r.phone.as_str()),
            ])?;
        }
    }

    writer.flush()?;
    info!(path = %path.display(), clusters = report.clusters.len(), "wrote cluster report");
    Ok(())
}

fn index_roster(roster: &[ProviderRecord]) -> HashMap<&str, &ProviderRecord> {
    roster.iter().map(|r| (r.record_id.as_str(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::LicenseState;
    use crate::pipeline::engine::{QualityEngine, RosterDatasets};
    use crate::pipeline::processing::normalize::normalize;
    use tempfile::tempdir;

    fn provider(id: &str, full_name: &str) -> ProviderRecord {
        ProviderRecord {
            record_id: id.to_string(),
            full_name: full_name.to_string(),
            normalized_name: normalize(full_name),
            last_name: "Shah".to_string(),
            primary_specialty: "Cardiology".to_string(),
            npi: None,
            phone: "555".to_string(),
            license_state: Some(LicenseState::Ca),
            license_number: Some("A100".to_string()),
            license_expiry: None,
        }
    }

    #[test]
    fn test_written_reports_round_trip_as_csv() {
        let datasets = RosterDatasets {
            roster: vec![provider("P1", "Dave Shah"), provider("P2", "David H Shah")],
            ..Default::default()
        };
        let engine =
            QualityEngine::with_default_scorer(EngineConfig::new(80, "2025-09-07").unwrap())
                .unwrap();
        let report = engine.run(&datasets).unwrap();

        let dir = tempdir().unwrap();
        let flag_path = dir.path().join("flags.csv");
        let cluster_path = dir.path().join("clusters.csv");

        write_flag_report(&flag_path, &datasets.roster, &report).unwrap();
        write_cluster_report(&cluster_path, &datasets.roster, &report).unwrap();

        let mut flag_reader = csv::Reader::from_path(&flag_path).unwrap();
        // Both records: invalid license (no CA table), missing npi, bad phone
        assert_eq!(flag_reader.records().count(), 6);

        let mut cluster_reader = csv::Reader::from_path(&cluster_path).unwrap();
        let rows: Vec<csv::StringRecord> =
            cluster_reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "P1");
        assert_eq!(&rows[0][2], "Dave Shah");
        assert_eq!(&rows[1][1], "P2");
    }
}
