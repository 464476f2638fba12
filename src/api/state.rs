//! Application state for the RTI engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::lifecycle::SubmissionManager;

/// Shared application state.
///
/// Holds the submission manager that every handler delegates to.
#[derive(Clone)]
pub struct AppState {
    manager: Arc<SubmissionManager>,
}

impl AppState {
    /// Creates a new application state around a submission manager.
    pub fn new(manager: SubmissionManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    /// Returns the submission manager.
    pub fn manager(&self) -> &SubmissionManager {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
