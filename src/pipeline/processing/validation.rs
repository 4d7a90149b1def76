//! Row-level validation checks, independent of the deduplication pipeline.
//!
//! Each check is stateless and total over the record set: a malformed row
//! gets a flag, never an aborted run. A record may accumulate flags from
//! several checks at once.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::domain::{FlagKind, LicenseState, ProviderRecord, StateLicenseRow, ValidationFlag};

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

/// State license tables keyed for (state, license number) lookup.
///
/// License numbers are trimmed on insert, mirroring the cleanup applied to
/// roster license numbers at load time.
#[derive(Debug, Clone, Default)]
pub struct LicenseReference {
    by_state: HashMap<LicenseState, HashMap<String, StateLicenseRow>>,
}

impl LicenseReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&mut self, state: LicenseState, rows: Vec<StateLicenseRow>) {
        let table = self.by_state.entry(state).or_default();
        for row in rows {
            table.insert(row.license_number.trim().to_string(), row);
        }
    }

    pub fn lookup(&self, state: LicenseState, license_number: &str) -> Option<&StateLicenseRow> {
        self.by_state
            .get(&state)
            .and_then(|table| table.get(license_number.trim()))
    }
}

/// Cross-reference a record's license against the state tables.
///
/// No match (including a record with no license state or number at all)
/// yields `InvalidLicense`. A matched license whose expiration date falls
/// strictly before the cutoff, or whose reference status reads "expired",
/// yields `ExpiredLicense`. At most one flag per record.
pub fn check_license(
    record: &ProviderRecord,
    reference: &LicenseReference,
    cutoff_date: NaiveDate,
) -> Option<ValidationFlag> {
    let (Some(state), Some(number)) = (record.license_state, record.license_number.as_deref())
    else {
        return Some(ValidationFlag {
            kind: FlagKind::InvalidLicense,
            record_id: record.record_id.clone(),
            detail: "no license state or number on record".to_string(),
        });
    };

    let Some(row) = reference.lookup(state, number) else {
        return Some(ValidationFlag {
            kind: FlagKind::InvalidLicense,
            record_id: record.record_id.clone(),
            detail: format!("license {number} not found in {state} reference table"),
        });
    };

    if row.status.trim().eq_ignore_ascii_case("expired") {
        return Some(ValidationFlag {
            kind: FlagKind::ExpiredLicense,
            record_id: record.record_id.clone(),
            detail: format!("license {number} marked expired by {state} board"),
        });
    }

    match row.expiration_date {
        Some(expiry) if expiry < cutoff_date => Some(ValidationFlag {
            kind: FlagKind::ExpiredLicense,
            record_id: record.record_id.clone(),
            detail: format!("license {number} expired {expiry} (cutoff {cutoff_date})"),
        }),
        _ => None,
    }
}

/// Flag records with no NPI. Presence only; format is out of scope here.
pub fn check_npi(record: &ProviderRecord) -> Option<ValidationFlag> {
    match record.npi.as_deref() {
        Some(npi) if !npi.trim().is_empty() => None,
        _ => Some(ValidationFlag {
            kind: FlagKind::MissingNpi,
            record_id: record.record_id.clone(),
            detail: "no NPI on record".to_string(),
        }),
    }
}

/// Flag phone numbers that do not reduce to exactly ten digits.
///
/// All non-digit characters are stripped first, so formatting variants of a
/// ten-digit number pass. No country-code handling: an 11-digit number is
/// flagged as-is.
pub fn check_phone(record: &ProviderRecord) -> Option<ValidationFlag> {
    let digits = NON_DIGIT.replace_all(&record.phone, "");
    if digits.len() == 10 {
        return None;
    }
    Some(ValidationFlag {
        kind: FlagKind::MalformedPhone,
        record_id: record.record_id.clone(),
        detail: format!(
            "phone '{}' reduces to {} digits, expected 10",
            record.phone,
            digits.len()
        ),
    })
}

/// Run all three checks over the full roster.
pub fn run_checks(
    roster: &[ProviderRecord],
    reference: &LicenseReference,
    cutoff_date: NaiveDate,
) -> Vec<ValidationFlag> {
    let mut flags = Vec::new();

    for record in roster {
        flags.extend(check_license(record, reference, cutoff_date));
        flags.extend(check_npi(record));
        flags.extend(check_phone(record));
    }

    for flag in &flags {
        crate::observability::metrics::validation::flag_raised(flag.kind.as_str());
    }

    flags
}
