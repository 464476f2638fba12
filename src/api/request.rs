//! Request types for the RTI engine API.
//!
//! This module defines the JSON request bodies for the filing endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PeriodAdjustmentInput, WorkerPayRecord};

/// Request body for `POST /filings/periodic-payment`.
///
/// Carries a finalised payroll run's worker records. The filing's tax
/// period is derived from `payment_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicPaymentRequest {
    /// Identifier of the payroll run being filed.
    pub payroll_run_id: String,
    /// The date the workers were paid.
    pub payment_date: NaiveDate,
    /// One record per worker paid in the run.
    pub worker_records: Vec<WorkerPayRecord>,
}

/// Request body for `POST /filings/period-adjustment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodAdjustmentRequest {
    /// Identifier of the payroll run the adjustment belongs to.
    pub payroll_run_id: String,
    /// Tax year label, e.g. "2024/2025".
    pub tax_year: String,
    /// Tax month, 1 to 12.
    pub tax_month: u32,
    /// Reclaims, deductions and flags for the period.
    #[serde(default)]
    pub adjustment: PeriodAdjustmentInput,
}

impl PeriodicPaymentRequest {
    /// Checks the fields serde cannot. Returns a message for the first
    /// problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.payroll_run_id.trim().is_empty() {
            return Err("payroll_run_id must not be empty".to_string());
        }
        if self.worker_records.is_empty() {
            return Err("worker_records must contain at least one record".to_string());
        }
        Ok(())
    }
}

impl PeriodAdjustmentRequest {
    /// Checks the fields serde cannot. Returns a message for the first
    /// problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.payroll_run_id.trim().is_empty() {
            return Err("payroll_run_id must not be empty".to_string());
        }
        if self.tax_year.trim().is_empty() {
            return Err("tax_year must not be empty".to_string());
        }
        if !(1..=12).contains(&self.tax_month) {
            return Err(format!("tax_month must be between 1 and 12, got {}", self.tax_month));
        }
        Ok(())
    }
}
