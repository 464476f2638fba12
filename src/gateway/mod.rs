//! Filing authority gateway.
//!
//! [`FilingGateway`] is the seam to the tax authority: one call to hand
//! over a submission and receive a reference, and one call to ask what
//! became of it. [`SimulatedGateway`] stands in for the real service.

mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RtiResult;
use crate::models::{FilingDocument, Submission};

pub use simulated::SimulatedGateway;

/// Acknowledgement returned when the gateway takes a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReceipt {
    /// Reference identifying the submission at the filing authority.
    pub reference: String,
}

/// Processing state reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum GatewayStatus {
    /// Still being processed.
    Pending,
    /// Accepted by the filing authority.
    Accepted,
    /// Refused by the filing authority.
    Rejected {
        /// Reason given by the authority.
        reason: String,
    },
}

/// A filing authority endpoint.
#[async_trait]
pub trait FilingGateway: Send + Sync {
    /// Hands a submission and its document to the filing authority.
    async fn submit(
        &self,
        submission: &Submission,
        document: Option<&FilingDocument>,
    ) -> RtiResult<GatewayReceipt>;

    /// Asks the filing authority for the state of a submission.
    async fn poll_status(&self, reference: &str) -> RtiResult<GatewayStatus>;
}

/// A shareable gateway.
pub type GatewayRef = Arc<dyn FilingGateway>;
