/// Error types for the event detection engine
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for threshold, detection and coverage operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The record must cover at least one full calendar year
    #[error("Invalid record span: {first_year} to {last_year}")]
    InvalidRecordSpan { first_year: i32, last_year: i32 },

    /// A date falls outside the materialized record
    #[error("Date outside of record: {0}")]
    DateOutOfRange(NaiveDate),

    /// Quantile probability outside of [0, 1]
    #[error("Invalid quantile probability: {0}")]
    InvalidQuantile(f64),

    /// No definition is registered under this id
    #[error("Unknown definition: {0}")]
    UnknownDefinition(u8),

    /// A threshold profile of the wrong shape was supplied for a definition
    #[error("Threshold profile does not match the criterion of definition {0}")]
    ProfileMismatch(u8),

    /// A region has no counties assigned to it
    #[error("Region has no member counties: {0}")]
    DegenerateRegion(String),

    /// A required series or mapping is absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Spatial-aggregation method name not recognized
    #[error("Unknown aggregation method: {0}")]
    UnknownMethod(String),
}

impl EngineError {
    /// Short machine-readable name used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRecordSpan { .. } => "invalid_record_span",
            EngineError::DateOutOfRange(_) => "date_out_of_range",
            EngineError::InvalidQuantile(_) => "invalid_quantile",
            EngineError::UnknownDefinition(_) => "unknown_definition",
            EngineError::ProfileMismatch(_) => "profile_mismatch",
            EngineError::DegenerateRegion(_) => "degenerate_region",
            EngineError::MissingInput(_) => "missing_input",
            EngineError::UnknownMethod(_) => "unknown_method",
        }
    }
}

/// Type alias for Results using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
