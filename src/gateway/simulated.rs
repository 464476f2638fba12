//! In-process stand-in for the filing authority.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{RtiError, RtiResult};
use crate::models::{FilingDocument, Submission};

use super::{FilingGateway, GatewayReceipt, GatewayStatus};

/// A gateway that acknowledges every submission after a fixed delay and
/// reports it accepted once the acceptance delay has elapsed.
///
/// References carry their receipt time (`{prefix}-{yyyymmddHHMMSS}-{hex}`),
/// so a reference issued by an earlier process is still answered after a
/// restart. Finished references are forgotten once reported.
///
/// # Example
///
/// ```
/// use rti_engine::config::GatewayConfig;
/// use rti_engine::gateway::SimulatedGateway;
///
/// let gateway = SimulatedGateway::new(GatewayConfig {
///     submit_delay_ms: 0,
///     acceptance_delay_ms: 0,
///     ..GatewayConfig::default()
/// });
/// # let _ = gateway;
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    config: GatewayConfig,
    received: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl SimulatedGateway {
    /// Creates a simulated gateway with the given timings.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            received: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn next_reference(&self, received_at: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}",
            self.config.reference_prefix,
            received_at.format("%Y%m%d%H%M%S"),
            &suffix[..8].to_uppercase()
        )
    }

    /// Reads the receipt time back out of a reference this gateway issued.
    fn issued_at(&self, reference: &str) -> Option<DateTime<Utc>> {
        let rest = reference.strip_prefix(&self.config.reference_prefix)?;
        let (stamp, suffix) = rest.strip_prefix('-')?.split_once('-')?;
        if suffix.len() != 8 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
            .ok()
            .map(|issued| issued.and_utc())
    }
}

#[async_trait]
impl FilingGateway for SimulatedGateway {
    async fn submit(
        &self,
        submission: &Submission,
        _document: Option<&FilingDocument>,
    ) -> RtiResult<GatewayReceipt> {
        sleep(self.config.submit_delay()).await;

        let received_at = Utc::now();
        let reference = self.next_reference(received_at);
        self.received
            .lock()
            .await
            .insert(reference.clone(), received_at);

        debug!(
            submission_id = %submission.id,
            gateway_reference = %reference,
            "Simulated gateway acknowledged submission"
        );
        Ok(GatewayReceipt { reference })
    }

    async fn poll_status(&self, reference: &str) -> RtiResult<GatewayStatus> {
        let mut received = self.received.lock().await;
        let received_at = match received.get(reference) {
            Some(received_at) => *received_at,
            None => self.issued_at(reference).ok_or_else(|| RtiError::Gateway {
                message: format!("unknown gateway reference '{}'", reference),
            })?,
        };

        let elapsed = (Utc::now() - received_at).to_std().unwrap_or_default();
        if elapsed >= self.config.acceptance_delay() {
            received.remove(reference);
            Ok(GatewayStatus::Accepted)
        } else {
            received.insert(reference.to_string(), received_at);
            Ok(GatewayStatus::Pending)
        }
    }
}
