use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RtiError, RtiResult};
use crate::models::{FilingDocument, Submission};

use super::{FilingRepository, SubmissionRepository};

/// A thread-safe in-memory submission store.
///
/// Uses `Arc<RwLock<HashMap<Uuid, Submission>>>` so clones share the same
/// records. Suitable for tests and single-process deployments.
#[derive(Default, Clone)]
pub struct InMemorySubmissionStore {
    submissions: Arc<RwLock<HashMap<Uuid, Submission>>>,
}

impl InMemorySubmissionStore {
    /// Creates a new, empty submission store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionStore {
    async fn insert(&self, submission: Submission) -> RtiResult<Submission> {
        let mut submissions = self.submissions.write().await;
        if submissions.contains_key(&submission.id) {
            return Err(RtiError::Storage {
                message: format!("submission {} already exists", submission.id),
            });
        }
        submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn get(&self, id: Uuid) -> RtiResult<Option<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(&id).cloned())
    }

    async fn update(&self, mut submission: Submission) -> RtiResult<Submission> {
        let mut submissions = self.submissions.write().await;
        let stored = submissions
            .get(&submission.id)
            .ok_or(RtiError::SubmissionNotFound { id: submission.id })?;

        if stored.version != submission.version {
            return Err(RtiError::ConcurrentModification {
                id: submission.id,
                expected: submission.version,
                found: stored.version,
            });
        }

        submission.version += 1;
        submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn all(&self) -> RtiResult<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        let mut all: Vec<Submission> = submissions.values().cloned().collect();
        all.sort_by(|a, b| a.created_date.cmp(&b.created_date).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

/// A thread-safe in-memory filing document store.
#[derive(Default, Clone)]
pub struct InMemoryFilingStore {
    documents: Arc<RwLock<HashMap<Uuid, FilingDocument>>>,
}

impl InMemoryFilingStore {
    /// Creates a new, empty filing store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilingRepository for InMemoryFilingStore {
    async fn insert(&self, document: FilingDocument) -> RtiResult<FilingDocument> {
        let mut documents = self.documents.write().await;
        let id = document.id();
        if documents.contains_key(&id) {
            return Err(RtiError::Storage {
                message: format!("filing document {} already exists", id),
            });
        }
        documents.insert(id, document.clone());
        Ok(document)
    }

    async fn get(&self, id: Uuid) -> RtiResult<Option<FilingDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id).cloned())
    }

    async fn link(&self, id: Uuid, submission_id: Uuid) -> RtiResult<FilingDocument> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&id)
            .ok_or(RtiError::FilingNotFound { id })?;

        if let Some(owner) = document.submission_id() {
            return Err(RtiError::FilingAlreadyLinked {
                id,
                submission_id: owner,
            });
        }
        document.set_submission_id(Some(submission_id));
        Ok(document.clone())
    }

    async fn unlink(&self, id: Uuid, submission_id: Uuid) -> RtiResult<()> {
        let mut documents = self.documents.write().await;
        if let Some(document) = documents.get_mut(&id) {
            if document.submission_id() == Some(submission_id) {
                document.set_submission_id(None);
            }
        }
        Ok(())
    }
}
