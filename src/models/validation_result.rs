//! Structured validation and submission outcomes.
//!
//! Format violations are data, not errors: every rule that fails produces
//! an [`Issue`] and the caller decides what to show or do.

use serde::{Deserialize, Serialize};

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks submission.
    Error,
    /// Reported alongside the submission but does not block it.
    Warning,
}

/// A single rule violation.
///
/// # Example
///
/// ```
/// use rti_engine::models::{Issue, Severity};
///
/// let issue = Issue::error("INVALID_NI", "National Insurance number is not valid", "ni_number");
/// assert_eq!(issue.severity, Severity::Error);
/// assert!(issue.record_ref.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Machine-readable code, e.g. "INVALID_TAX_CODE".
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// The field the rule checked.
    pub field: String,
    /// Whether the issue blocks submission.
    pub severity: Severity,
    /// The worker record the issue came from, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_ref: Option<String>,
}

impl Issue {
    /// Creates a blocking issue.
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: field.into(),
            severity: Severity::Error,
            record_ref: None,
        }
    }

    /// Creates a non-blocking issue.
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: field.into(),
            severity: Severity::Warning,
            record_ref: None,
        }
    }

    /// Tags the issue with the worker record it belongs to.
    pub fn for_record(mut self, record_ref: impl Into<String>) -> Self {
        self.record_ref = Some(record_ref.into());
        self
    }
}

/// The outcome of validating a record or a whole submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when there are no errors.
    pub is_valid: bool,
    /// Blocking issues.
    pub errors: Vec<Issue>,
    /// Non-blocking issues.
    pub warnings: Vec<Issue>,
    /// True when the submission may be sent to the gateway.
    pub can_submit: bool,
}

impl ValidationResult {
    /// Builds a result from collected issues, deriving the flags.
    pub fn from_issues(errors: Vec<Issue>, warnings: Vec<Issue>) -> Self {
        let clean = errors.is_empty();
        Self {
            is_valid: clean,
            errors,
            warnings,
            can_submit: clean,
        }
    }

    /// A result with a single fatal error.
    pub fn fatal(issue: Issue) -> Self {
        Self::from_issues(vec![issue], Vec::new())
    }

    /// Appends another result's issues to this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.is_valid = self.errors.is_empty();
        self.can_submit = self.is_valid;
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::from_issues(Vec::new(), Vec::new())
    }
}

/// The outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// True when the gateway acknowledged the submission.
    pub success: bool,
    /// Reference returned by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_reference: Option<String>,
    /// Errors that stopped the submission.
    #[serde(default)]
    pub errors: Vec<Issue>,
    /// Warnings attached to an accepted submission.
    #[serde(default)]
    pub warnings: Vec<Issue>,
}

impl SubmitOutcome {
    /// A successful submission.
    pub fn accepted(gateway_reference: String, warnings: Vec<Issue>) -> Self {
        Self {
            success: true,
            gateway_reference: Some(gateway_reference),
            errors: Vec::new(),
            warnings,
        }
    }

    /// A refused submission.
    pub fn failed(errors: Vec<Issue>) -> Self {
        Self {
            success: false,
            gateway_reference: None,
            errors,
            warnings: Vec::new(),
        }
    }
}
