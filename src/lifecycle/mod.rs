//! Submission lifecycle.
//!
//! [`SubmissionManager`] owns the path from a payroll run's filing document
//! to a confirmed submission: creation, validation, the gateway hand-off and
//! the deferred confirmation run by [`ConfirmationScheduler`].

mod manager;
mod scheduler;

pub use manager::{CONFIRMATION_PENDING, MAX_CONFIRMATION_POLLS, SubmissionManager};
pub use scheduler::ConfirmationScheduler;
