//! Error types for malformed engine input
//!
//! Numeric edge cases (non-finite rates, out-of-range dates, missing owner
//! interest) never reach this type; they are coerced where they occur. Only
//! input that cannot be interpreted at all fails here.

use thiserror::Error;

/// Errors raised at the data-ingestion boundary
#[derive(Debug, Error)]
pub enum EngineError {
    /// A production row carried no well identifier
    #[error("production row {row} has no well identifier")]
    MissingWellId { row: usize },

    /// A month value could not be parsed
    #[error("invalid month '{0}': expected YYYY-MM-DD, YYYY-MM or an RFC 3339 timestamp")]
    InvalidMonth(String),

    /// A decline type code was not recognised
    #[error("unknown decline type '{0}': expected EXP or HYP")]
    UnknownDeclineType(String),

    /// Engine configuration failed validation
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
