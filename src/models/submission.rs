//! Submission model and lifecycle vocabulary.
//!
//! A [`Submission`] is one statutory filing intent. Its [`SubmissionStatus`]
//! only changes through [`SubmissionEvent`]s applied by the status machine
//! in [`crate::compliance::transition`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Issue;

/// The kind of RTI filing a submission represents.
///
/// # Example
///
/// ```
/// use rti_engine::models::SubmissionType;
///
/// assert!(SubmissionType::PeriodicPayment.requires_filing_document());
/// assert!(!SubmissionType::NilPayment.requires_filing_document());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    /// Payments made to workers in a tax period.
    PeriodicPayment,
    /// Period-level adjustments and reclaims.
    PeriodAdjustment,
    /// Alignment of the employer's worker list with the authority's records.
    EmployerAlignment,
    /// Declaration that no payments were made in the period.
    NilPayment,
}

impl SubmissionType {
    /// Returns true if submissions of this type are backed by a filing document.
    pub fn requires_filing_document(&self) -> bool {
        matches!(
            self,
            SubmissionType::PeriodicPayment | SubmissionType::PeriodAdjustment
        )
    }
}

impl std::fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionType::PeriodicPayment => write!(f, "periodic_payment"),
            SubmissionType::PeriodAdjustment => write!(f, "period_adjustment"),
            SubmissionType::EmployerAlignment => write!(f, "employer_alignment"),
            SubmissionType::NilPayment => write!(f, "nil_payment"),
        }
    }
}

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Created from a payroll run, not yet checked.
    Draft,
    /// Passed validation and awaiting submission.
    Ready,
    /// Acknowledged by the gateway, awaiting confirmation.
    Submitted,
    /// Confirmed by the filing authority.
    Accepted,
    /// Refused by the filing authority.
    Rejected,
    /// Superseded by a correcting filing.
    Corrected,
}

impl SubmissionStatus {
    /// Statuses that still need to be sent to the gateway.
    pub const PENDING: [SubmissionStatus; 2] = [SubmissionStatus::Draft, SubmissionStatus::Ready];

    /// Statuses the gateway has acknowledged.
    pub const SUBMITTED: [SubmissionStatus; 2] =
        [SubmissionStatus::Submitted, SubmissionStatus::Accepted];
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Draft => write!(f, "draft"),
            SubmissionStatus::Ready => write!(f, "ready"),
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Accepted => write!(f, "accepted"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
            SubmissionStatus::Corrected => write!(f, "corrected"),
        }
    }
}

/// Something that happens to a submission and may change its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionEvent {
    /// Validation passed and the submission is queued for filing.
    MarkReady,
    /// The gateway acknowledged receipt.
    Submit,
    /// The filing authority confirmed the submission.
    Accept,
    /// The filing authority refused the submission.
    Reject,
    /// A correcting filing replaced this submission.
    Correct,
}

impl std::fmt::Display for SubmissionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionEvent::MarkReady => write!(f, "mark_ready"),
            SubmissionEvent::Submit => write!(f, "submit"),
            SubmissionEvent::Accept => write!(f, "accept"),
            SubmissionEvent::Reject => write!(f, "reject"),
            SubmissionEvent::Correct => write!(f, "correct"),
        }
    }
}

/// One statutory filing intent and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier for the submission.
    pub id: Uuid,
    /// The kind of filing.
    #[serde(rename = "type")]
    pub submission_type: SubmissionType,
    /// Fiscal year label, e.g. "2024/2025".
    pub tax_year: String,
    /// Fiscal month, 1 (April) to 12 (March).
    pub tax_month: u32,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// When the submission was created.
    pub created_date: DateTime<Utc>,
    /// When the gateway acknowledged the submission.
    #[serde(default)]
    pub submitted_date: Option<DateTime<Utc>>,
    /// When the filing authority confirmed the submission.
    #[serde(default)]
    pub accepted_date: Option<DateTime<Utc>>,
    /// The upstream payroll run this submission reports.
    pub payroll_run_id: String,
    /// The filing document owned by this submission, if the type has one.
    #[serde(default)]
    pub filing_document_id: Option<Uuid>,
    /// PAYE employer reference.
    pub employer_ref: String,
    /// Number of workers reported.
    pub employees_count: usize,
    /// Total gross payments reported.
    pub total_payment: Decimal,
    /// Total income tax deducted.
    pub total_tax: Decimal,
    /// Total employee National Insurance deducted.
    pub total_ni: Decimal,
    /// Reference assigned by the gateway on acknowledgement.
    #[serde(default)]
    pub gateway_reference: Option<String>,
    /// Errors attached at validation or submission time.
    #[serde(default)]
    pub errors: Vec<Issue>,
    /// Warnings attached at validation or submission time.
    #[serde(default)]
    pub warnings: Vec<Issue>,
    /// Optimistic concurrency counter, bumped by every store update.
    #[serde(default)]
    pub version: u64,
}
