//! Error types for the RTI engine.
//!
//! Format violations and failed submissions are reported as values
//! (see [`crate::models::ValidationResult`] and
//! [`crate::models::SubmitOutcome`]). This module covers everything else:
//! configuration problems, missing records, illegal status changes and
//! storage or gateway faults.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{SubmissionEvent, SubmissionStatus};

/// The main error type for the RTI engine.
///
/// # Example
///
/// ```
/// use rti_engine::error::RtiError;
///
/// let error = RtiError::ConfigNotFound {
///     path: "/missing/rti.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/rti.yaml");
/// ```
#[derive(Debug, Error)]
pub enum RtiError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No submission exists with the given id.
    #[error("Submission not found: {id}")]
    SubmissionNotFound {
        /// The submission id that was looked up.
        id: Uuid,
    },

    /// No filing document exists with the given id.
    #[error("Filing document not found: {id}")]
    FilingNotFound {
        /// The filing document id that was looked up.
        id: Uuid,
    },

    /// The submission type needs a filing document but none was supplied.
    #[error("Submission type '{submission_type}' requires a filing document")]
    MissingFilingDocument {
        /// The submission type being created.
        submission_type: String,
    },

    /// The filing document is of a different kind than the submission type.
    #[error("Filing document {id} cannot back a '{submission_type}' submission")]
    FilingTypeMismatch {
        /// The filing document id.
        id: Uuid,
        /// The submission type being created.
        submission_type: String,
    },

    /// The filing document already belongs to another submission.
    #[error("Filing document {id} is already owned by submission {submission_id}")]
    FilingAlreadyLinked {
        /// The filing document id.
        id: Uuid,
        /// The submission that owns it.
        submission_id: Uuid,
    },

    /// The status machine has no transition for this state and event.
    #[error("Cannot apply '{event}' to a submission in status '{from}'")]
    InvalidTransition {
        /// The current status.
        from: SubmissionStatus,
        /// The event that was rejected.
        event: SubmissionEvent,
    },

    /// A write was based on a stale copy of the record.
    #[error("Submission {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// The submission id.
        id: Uuid,
        /// The version the writer read.
        expected: u64,
        /// The version currently stored.
        found: u64,
    },

    /// The filing gateway failed or timed out.
    #[error("Gateway error: {message}")]
    Gateway {
        /// A description of the gateway failure.
        message: String,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

/// A type alias for Results that return RtiError.
pub type RtiResult<T> = Result<T, RtiError>;
