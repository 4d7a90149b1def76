use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A provider roster row after load-time validation and normalization.
///
/// Immutable once loaded; `record_id` is unique across the roster (the
/// loader enforces this).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub record_id: String,
    pub full_name: String,
    pub normalized_name: String,
    pub last_name: String,
    pub primary_specialty: String,
    pub npi: Option<String>,
    pub phone: String,
    pub license_state: Option<LicenseState>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
}

/// States with a configured license-board extract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LicenseState {
    Ca,
    Ny,
}

impl LicenseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseState::Ca => "CA",
            LicenseState::Ny => "NY",
        }
    }
}

impl fmt::Display for LicenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CA" => Ok(LicenseState::Ca),
            "NY" => Ok(LicenseState::Ny),
            other => Err(format!("unsupported license state: {other}")),
        }
    }
}

/// One row of a state license-board extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateLicenseRow {
    pub license_number: String,
    pub status: String,
    pub expiration_date: Option<NaiveDate>,
}

/// One row of the NPI registry extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpiRow {
    pub npi: String,
    pub full_name: String,
}

/// The data-quality defect classes the engine reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FlagKind {
    ExpiredLicense,
    InvalidLicense,
    MissingNpi,
    MalformedPhone,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::ExpiredLicense => "expired_license",
            FlagKind::InvalidLicense => "invalid_license",
            FlagKind::MissingNpi => "missing_npi",
            FlagKind::MalformedPhone => "malformed_phone",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation outcome for one roster record.
///
/// A record may carry zero or more flags; flags are independent of the
/// deduplication output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFlag {
    pub kind: FlagKind,
    pub record_id: String,
    pub detail: String,
}

/// A set of roster records resolved to the same provider entity.
///
/// Members are sorted by record id; identity is the member set, not the
/// ordering. Always has at least two members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateCluster {
    pub members: Vec<String>,
}

impl DuplicateCluster {
    pub fn new(mut members: Vec<String>) -> Self {
        members.sort();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, record_id: &str) -> bool {
        self.members.iter().any(|m| m == record_id)
    }
}
