//! Domain-level error taxonomy for repotag.
//!
//! Only malformed rule definitions, configuration and I/O are errors. Absent
//! signals, malformed payloads and empty cohorts are ordinary control flow and
//! never surface here.

/// Errors produced when validating a band table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BandError {
    #[error("band table must not be empty")]
    Empty,

    #[error("band table must end with a default band")]
    MissingDefault,

    #[error("default band '{name}' must be the last band")]
    DefaultNotLast { name: String },

    #[error("band '{name}' threshold {upper} is not greater than previous threshold {previous}")]
    NonIncreasing {
        name: String,
        previous: f64,
        upper: f64,
    },

    #[error("band '{name}' threshold must be a finite number")]
    NonFiniteThreshold { name: String },
}

/// repotag domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("invalid band table: {0}")]
    InvalidBands(#[from] BandError),

    #[error("invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("duplicate {tier} rule name: {name}")]
    DuplicateRule { tier: &'static str, name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("fingerprint store error: {0}")]
    Store(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for repotag domain operations.
pub type Result<T> = std::result::Result<T, ClassifyError>;
