use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

use crate::error::{DqError, Result};

/// Default similarity cutoff for fuzzy name matching.
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 90;

/// Default analysis date for license-expiry comparison.
pub const DEFAULT_CUTOFF_DATE: &str = "2025-09-07";

/// Engine configuration supplied by the caller.
///
/// Both parameters affect engine output and must participate in any cache
/// key the caller maintains (see `crate::cache`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum acceptable pair score for two records to be linked, 0-100.
    pub similarity_threshold: u8,
    /// Licenses expiring strictly before this date are flagged as expired.
    pub cutoff_date: NaiveDate,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            // The default date string is a compile-time constant
            cutoff_date: NaiveDate::parse_from_str(DEFAULT_CUTOFF_DATE, "%Y-%m-%d").unwrap(),
        }
    }
}

impl EngineConfig {
    /// Build a validated configuration from caller-supplied parameters.
    ///
    /// Rejection happens here, before any pipeline run, so a bad threshold
    /// or date is fatal only to this invocation.
    pub fn new(similarity_threshold: u8, cutoff_date: &str) -> Result<Self> {
        let cutoff_date = NaiveDate::parse_from_str(cutoff_date, "%Y-%m-%d")
            .map_err(|e| DqError::Config(format!("unparsable cutoff date '{cutoff_date}': {e}")))?;
        let config = Self {
            similarity_threshold,
            cutoff_date,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .map_err(|e| DqError::Config(format!("Failed to read config file '{config_path}': {e}")))?;

        let config: EngineConfig = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.similarity_threshold > 100 {
            return Err(DqError::Config(format!(
                "similarity threshold must be in [0, 100], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_threshold, 90);
        assert_eq!(config.cutoff_date, NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err = EngineConfig::new(101, "2025-09-07").unwrap_err();
        assert!(matches!(err, DqError::Config(_)));
    }

    #[test]
    fn test_unparsable_cutoff_date_rejected() {
        let err = EngineConfig::new(90, "September 7th").unwrap_err();
        assert!(matches!(err, DqError::Config(_)));
    }

    #[test]
    fn test_config_from_toml() {
        let config: EngineConfig = toml::from_str(
            "similarity_threshold = 85\ncutoff_date = \"2025-01-01\"\n",
        )
        .unwrap();
        assert_eq!(config.similarity_threshold, 85);
        assert_eq!(config.cutoff_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"similarity_threshold = 85\ncutoff_date = \"2025-01-01\"\n")
            .unwrap();
        file.flush().unwrap();

        let config = EngineConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.similarity_threshold, 85);
        assert_eq!(config.cutoff_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = EngineConfig::load("no/such/config.toml").unwrap_err();
        assert!(matches!(err, DqError::Config(_)));
    }

    #[test]
    fn test_load_rejects_out_of_range_threshold() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"similarity_threshold = 101\ncutoff_date = \"2025-01-01\"\n")
            .unwrap();
        file.flush().unwrap();

        let err = EngineConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DqError::Config(_)));
    }
}
