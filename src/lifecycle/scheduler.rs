//! Deferred confirmation tasks.
//!
//! Each submitted filing gets one background task that waits for the
//! gateway to confirm it. Tasks are keyed by submission id so they can be
//! replaced or cancelled; the durable record of outstanding work is the
//! `Submitted` status in the store, which
//! [`super::SubmissionManager::resume_pending_confirmations`] reads back
//! after a restart.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::AbortHandle;
use uuid::Uuid;

/// Tracks one cancellable background task per submission.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationScheduler {
    tasks: Arc<Mutex<HashMap<Uuid, AbortHandle>>>,
}

impl ConfirmationScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` for `submission_id`, aborting any task already
    /// scheduled for the same submission.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, submission_id: Uuid, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task).abort_handle();

        let mut tasks = self.lock();
        tasks.retain(|_, h| !h.is_finished());
        if let Some(previous) = tasks.insert(submission_id, handle) {
            previous.abort();
        }
    }

    /// Cancels the task for `submission_id`.
    ///
    /// Returns true if a task was still running.
    pub fn cancel(&self, submission_id: Uuid) -> bool {
        match self.lock().remove(&submission_id) {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                running
            }
            None => false,
        }
    }

    /// Returns true if a task for `submission_id` is still running.
    pub fn is_scheduled(&self, submission_id: Uuid) -> bool {
        self.lock()
            .get(&submission_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of tasks still running.
    pub fn active_count(&self) -> usize {
        self.lock()
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, AbortHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
