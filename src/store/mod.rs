//! Repository interfaces for submissions and filing documents.
//!
//! The lifecycle manager only talks to storage through these traits, so a
//! database-backed store can replace [`InMemorySubmissionStore`] and
//! [`InMemoryFilingStore`] without touching the engine.
//!
//! Submission updates are compare-and-swap on [`Submission::version`]: a
//! writer holding a stale copy gets [`crate::error::RtiError::ConcurrentModification`]
//! instead of silently overwriting someone else's change. A filing document
//! is claimed by exactly one submission through [`FilingRepository::link`].

mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RtiResult;
use crate::models::{FilingDocument, Submission, SubmissionStatus};

pub use in_memory::{InMemoryFilingStore, InMemorySubmissionStore};

/// Storage for submission records.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stores a new submission. Fails if the id is already taken.
    async fn insert(&self, submission: Submission) -> RtiResult<Submission>;

    /// Fetches a submission by id.
    async fn get(&self, id: Uuid) -> RtiResult<Option<Submission>>;

    /// Replaces a submission if its version matches the stored one.
    ///
    /// Returns the stored record with its version incremented.
    async fn update(&self, submission: Submission) -> RtiResult<Submission>;

    /// Returns every submission, oldest first.
    async fn all(&self) -> RtiResult<Vec<Submission>>;

    /// Returns submissions in any of the given statuses, oldest first.
    async fn find_by_status(&self, statuses: &[SubmissionStatus]) -> RtiResult<Vec<Submission>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|s| statuses.contains(&s.status))
            .collect())
    }
}

/// Storage for filing documents.
#[async_trait]
pub trait FilingRepository: Send + Sync {
    /// Stores a new filing document. Fails if the id is already taken.
    async fn insert(&self, document: FilingDocument) -> RtiResult<FilingDocument>;

    /// Fetches a filing document by id.
    async fn get(&self, id: Uuid) -> RtiResult<Option<FilingDocument>>;

    /// Makes `submission_id` the owner of a document.
    ///
    /// The ownership check and the write are one step: a document that
    /// already has an owner fails with
    /// [`crate::error::RtiError::FilingAlreadyLinked`].
    async fn link(&self, id: Uuid, submission_id: Uuid) -> RtiResult<FilingDocument>;

    /// Releases a document held by `submission_id`. A document owned by
    /// someone else is left untouched.
    async fn unlink(&self, id: Uuid, submission_id: Uuid) -> RtiResult<()>;
}

/// A shareable submission repository.
pub type SubmissionStoreRef = Arc<dyn SubmissionRepository>;

/// A shareable filing repository.
pub type FilingStoreRef = Arc<dyn FilingRepository>;
