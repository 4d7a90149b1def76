//! CSV loading for the four input datasets.
//!
//! Rows are deserialized into raw serde structs and converted to typed
//! domain records here, at load time, so the engine core never infers
//! field semantics ad hoc. Per-row problems (blank fields, unparsable
//! dates, unknown states) degrade to `None` and are logged; only a missing
//! file, a broken CSV, or a duplicate record id fails the load.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::{LicenseState, NpiRow, ProviderRecord, StateLicenseRow};
use crate::error::{DqError, Result};
use crate::pipeline::engine::RosterDatasets;
use crate::pipeline::processing::normalize::normalize;

#[derive(Debug, Deserialize)]
struct RosterRow {
    provider_id: String,
    full_name: Option<String>,
    last_name: Option<String>,
    primary_specialty: Option<String>,
    npi: Option<String>,
    practice_phone: Option<String>,
    license_state: Option<String>,
    license_number: Option<String>,
    license_expiration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LicenseRow {
    license_number: Option<String>,
    status: Option<String>,
    expiration_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryRow {
    npi: Option<String>,
    full_name: Option<String>,
}

/// Load all four datasets for one engine run.
pub fn load_datasets(
    roster_path: &Path,
    ca_path: &Path,
    ny_path: &Path,
    npi_path: &Path,
) -> Result<RosterDatasets> {
    let datasets = RosterDatasets {
        roster: load_roster(roster_path)?,
        ca_licenses: load_license_table(ca_path)?,
        ny_licenses: load_license_table(ny_path)?,
        npi_registry: load_npi_registry(npi_path)?,
    };
    info!(
        providers = datasets.roster.len(),
        ca_licenses = datasets.ca_licenses.len(),
        ny_licenses = datasets.ny_licenses.len(),
        npi_rows = datasets.npi_registry.len(),
        "datasets loaded"
    );
    Ok(datasets)
}

/// Load the provider roster. Record ids must be present and unique.
pub fn load_roster(path: &Path) -> Result<Vec<ProviderRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for row in reader.deserialize() {
        let row: RosterRow = row?;
        if row.provider_id.trim().is_empty() {
            return Err(DqError::MissingField("provider_id".to_string()));
        }
        let record_id = row.provider_id.trim().to_string();
        if !seen_ids.insert(record_id.clone()) {
            return Err(DqError::DuplicateRecordId(record_id));
        }

        let full_name = non_blank(row.full_name).unwrap_or_default();
        let license_state = non_blank(row.license_state).and_then(|s| {
            s.parse::<LicenseState>()
                .map_err(|e| warn!(record_id = %record_id, "{e}; treating license as unmatched"))
                .ok()
        });

        records.push(ProviderRecord {
            record_id,
            normalized_name: normalize(&full_name),
            full_name,
            last_name: non_blank(row.last_name).unwrap_or_default(),
            primary_specialty: non_blank(row.primary_specialty).unwrap_or_default(),
            npi: non_blank(row.npi),
            phone: non_blank(row.practice_phone).unwrap_or_default(),
            license_state,
            // Trimmed here so reference joins compare clean numbers
            license_number: non_blank(row.license_number),
            license_expiry: row.license_expiration.as_deref().and_then(parse_date),
        });
    }

    Ok(records)
}

/// Load one state license-board extract. Rows without a license number
/// cannot be joined and are dropped with a warning.
pub fn load_license_table(path: &Path) -> Result<Vec<StateLicenseRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for row in reader.deserialize() {
        let row: LicenseRow = row?;
        let Some(license_number) = non_blank(row.license_number) else {
            warn!(path = %path.display(), "dropping license row without a license number");
            continue;
        };
        rows.push(StateLicenseRow {
            license_number,
            status: non_blank(row.status).unwrap_or_default(),
            expiration_date: row.expiration_date.as_deref().and_then(parse_date),
        });
    }

    Ok(rows)
}

pub fn load_npi_registry(path: &Path) -> Result<Vec<NpiRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for row in reader.deserialize() {
        let row: RegistryRow = row?;
        let Some(npi) = non_blank(row.npi) else {
            continue;
        };
        rows.push(NpiRow {
            npi,
            full_name: non_blank(row.full_name).unwrap_or_default(),
        });
    }

    Ok(rows)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lenient date parsing; unparsable dates become `None` rather than errors.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m-%d-%Y"))
        .map_err(|e| warn!("unparsable date '{raw}': {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_roster_converts_and_normalizes() {
        let file = csv_file(
            "provider_id,full_name,last_name,primary_specialty,npi,practice_phone,license_state,license_number,license_expiration\n\
             P1,Dr. Dave SHAH,Shah,Cardiology,1234567890,(555) 123-4567,CA, A100 ,2026-01-01\n\
             P2,Maria Lopez,Lopez,Oncology,,,ZZ,,not-a-date\n",
        );

        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 2);

        assert_eq!(roster[0].normalized_name, "dr dave shah");
        assert_eq!(roster[0].license_state, Some(LicenseState::Ca));
        assert_eq!(roster[0].license_number.as_deref(), Some("A100"));
        assert_eq!(
            roster[0].license_expiry,
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );

        // Blank npi becomes None; unknown state degrades to None
        assert_eq!(roster[1].npi, None);
        assert_eq!(roster[1].license_state, None);
        assert_eq!(roster[1].license_expiry, None);
    }

    #[test]
    fn test_duplicate_record_id_is_a_load_error() {
        let file = csv_file(
            "provider_id,full_name,last_name,primary_specialty,npi,practice_phone,license_state,license_number,license_expiration\n\
             P1,Dave Shah,Shah,Cardiology,,,,,\n\
             P1,Dave Shah,Shah,Cardiology,,,,,\n",
        );

        let err = load_roster(file.path()).unwrap_err();
        assert!(matches!(err, DqError::DuplicateRecordId(id) if id == "P1"));
    }

    #[test]
    fn test_license_rows_without_number_are_dropped() {
        let file = csv_file(
            "license_number,status,expiration_date\n\
             A100,active,2026-01-01\n\
             ,expired,2020-01-01\n",
        );

        let rows = load_license_table(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].license_number, "A100");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_roster(Path::new("no/such/file.csv")).is_err());
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("2026-01-31"), NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(parse_date("01/31/2026"), NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
    }
}
