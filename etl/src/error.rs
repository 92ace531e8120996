//! Error types for the offer ETL pipeline.
//!
//! One error type per stage, wrapped by a top-level error:
//!
//! - [`NormalizeError`] - catalog and profile normalization errors
//! - [`EventError`] - event log preprocessing errors
//! - [`MergeError`] - lookup join errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use thiserror::Error;

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while normalizing the offer catalog or the profile table.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Offer type text matched none of the known categories
    /// (only raised under [`crate::OfferTypePolicy::Reject`]).
    #[error("Unrecognized offer type '{value}' for offer {index}")]
    UnrecognizedOfferType { index: usize, value: String },

    /// Some incomes are missing but none are present to compute a mean from.
    #[error("Cannot impute {missing} missing incomes: no income values present")]
    NoIncomeData { missing: usize },
}

// =============================================================================
// Event Errors
// =============================================================================

/// Errors while decoding raw event rows.
#[derive(Debug, Error)]
pub enum EventError {
    /// Person id absent from the person dictionary.
    #[error("Row {row}: unknown person id '{person}'")]
    UnknownPerson { row: usize, person: String },

    /// Offer id absent from the offer dictionary.
    #[error("Row {row}: unknown offer id '{offer}'")]
    UnknownOffer { row: usize, offer: String },

    /// Event kind text is not one of the known kinds.
    #[error("Row {row}: unknown event kind '{kind}'")]
    UnknownEventKind { row: usize, kind: String },

    /// Payload field has the wrong type.
    #[error("Row {row}: invalid payload field '{field}': {message}")]
    InvalidPayload {
        row: usize,
        field: String,
        message: String,
    },
}

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors while joining aggregates with reference tables.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Aggregate references an offer that is not in the catalog.
    #[error("Offer {0} not found in catalog")]
    UnknownOffer(u32),

    /// Aggregate references a person that is not in the profile table.
    #[error("Person {0} not found in profiles")]
    UnknownPerson(usize),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::run_pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Normalization error.
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Event preprocessing error.
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Merge error.
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Options parsing or output serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for event preprocessing.
pub type EventResult<T> = Result<T, EventError>;

/// Result type for merges.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // NormalizeError -> PipelineError
        let err = NormalizeError::NoIncomeData { missing: 3 };
        let pipeline_err: PipelineError = err.into();
        assert!(pipeline_err.to_string().contains("3 missing incomes"));

        // EventError -> PipelineError
        let err = EventError::UnknownPerson {
            row: 7,
            person: "abc".into(),
        };
        let pipeline_err: PipelineError = err.into();
        assert!(pipeline_err.to_string().contains("Row 7"));
        assert!(pipeline_err.to_string().contains("abc"));
    }

    #[test]
    fn test_offer_type_error_format() {
        let err = NormalizeError::UnrecognizedOfferType {
            index: 4,
            value: "voucher".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("voucher"));
        assert!(msg.contains("offer 4"));
    }
}
