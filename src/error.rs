use thiserror::Error;

#[derive(Error, Debug)]
pub enum DqError {
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate record id in roster: {0}")]
    DuplicateRecordId(String),
}

pub type Result<T> = std::result::Result<T, DqError>;
