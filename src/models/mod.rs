//! Core data models for the RTI engine.
//!
//! This module contains the submission, filing document, worker record
//! and validation outcome types used throughout the engine.

mod filing;
mod submission;
mod validation_result;
mod worker;

pub use filing::{
    FilingDocument, PeriodAdjustmentFiling, PeriodAdjustmentInput, PeriodicPaymentFiling,
};
pub use submission::{Submission, SubmissionEvent, SubmissionStatus, SubmissionType};
pub use validation_result::{Issue, Severity, SubmitOutcome, ValidationResult};
pub use worker::{
    Address, Gender, PayFrequency, PaymentMethod, StarterDeclaration, StudentLoanPlan,
    WorkerPayRecord,
};
