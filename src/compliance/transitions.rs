//! Submission status machine.
//!
//! All status changes go through [`transition`]. The table below is the
//! complete set of legal moves; anything else is an
//! [`RtiError::InvalidTransition`].
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Draft | MarkReady | Ready |
//! | Draft, Ready | Submit | Submitted |
//! | Submitted | Accept | Accepted |
//! | Submitted | Reject | Rejected |
//! | Accepted, Rejected | Correct | Corrected |

use crate::error::{RtiError, RtiResult};
use crate::models::{SubmissionEvent, SubmissionStatus};

/// Returns the status reached by applying `event` in status `from`.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::transition;
/// use rti_engine::models::{SubmissionEvent, SubmissionStatus};
///
/// assert_eq!(
///     transition(SubmissionStatus::Draft, SubmissionEvent::Submit).unwrap(),
///     SubmissionStatus::Submitted
/// );
/// assert!(transition(SubmissionStatus::Accepted, SubmissionEvent::Submit).is_err());
/// ```
pub fn transition(from: SubmissionStatus, event: SubmissionEvent) -> RtiResult<SubmissionStatus> {
    use SubmissionEvent::*;
    use SubmissionStatus::*;

    match (from, event) {
        (Draft, MarkReady) => Ok(Ready),
        (Draft | Ready, Submit) => Ok(Submitted),
        (Submitted, Accept) => Ok(Accepted),
        (Submitted, Reject) => Ok(Rejected),
        (Accepted | Rejected, Correct) => Ok(Corrected),
        _ => Err(RtiError::InvalidTransition { from, event }),
    }
}

/// Returns true if `event` is legal in status `from`.
pub fn can_transition(from: SubmissionStatus, event: SubmissionEvent) -> bool {
    transition(from, event).is_ok()
}
