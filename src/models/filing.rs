//! Filing document models.
//!
//! A filing document is the body of a submission. There are two kinds:
//! [`PeriodicPaymentFiling`] reports individual worker payments and
//! [`PeriodAdjustmentFiling`] reports period-level reclaims. Both are
//! wrapped in [`FilingDocument`] for storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkerPayRecord;

/// A payment-period filing body with aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicPaymentFiling {
    /// Unique identifier for the document.
    pub id: Uuid,
    /// The owning submission, set once the submission is created.
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    /// The upstream payroll run the figures come from.
    pub payroll_run_id: String,
    /// Fiscal year label, e.g. "2024/2025".
    pub tax_year: String,
    /// Fiscal month, 1 to 12.
    pub tax_month: u32,
    /// The date workers were paid.
    pub payment_date: NaiveDate,
    /// PAYE employer reference.
    pub employer_ref: String,
    /// Accounts office reference.
    pub accounts_office_ref: String,
    /// One entry per worker paid.
    pub worker_records: Vec<WorkerPayRecord>,
    /// Sum of gross pay.
    pub total_payment: Decimal,
    /// Sum of income tax.
    pub total_tax: Decimal,
    /// Sum of employee NI.
    pub total_employee_ni: Decimal,
    /// Sum of employer NI.
    pub total_employer_ni: Decimal,
    /// Sum of student loan deductions.
    pub total_student_loan: Decimal,
}

/// Reclaim and adjustment figures supplied by the caller.
///
/// Any figure left unset is treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodAdjustmentInput {
    /// No payments were made to workers in this period.
    pub no_payment_for_period: bool,
    /// CIS deductions suffered.
    pub cis_deductions_suffered: Option<Decimal>,
    /// Statutory sick pay reclaimed.
    pub ssp_reclaimed: Option<Decimal>,
    /// Statutory maternity pay reclaimed.
    pub smp_reclaimed: Option<Decimal>,
    /// Statutory paternity pay reclaimed.
    pub spp_reclaimed: Option<Decimal>,
    /// Statutory adoption pay reclaimed.
    pub sap_reclaimed: Option<Decimal>,
    /// The employer is claiming employment allowance.
    pub employment_allowance: bool,
    /// Apprenticeship levy due year to date.
    pub apprenticeship_levy: Option<Decimal>,
}

/// A summary-only adjustment filing for one tax period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAdjustmentFiling {
    /// Unique identifier for the document.
    pub id: Uuid,
    /// The owning submission, set once the submission is created.
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    /// Fiscal year label.
    pub tax_year: String,
    /// Fiscal month, 1 to 12.
    pub tax_month: u32,
    /// PAYE employer reference.
    pub employer_ref: String,
    /// No payments were made to workers in this period.
    pub no_payment_for_period: bool,
    /// CIS deductions suffered.
    pub cis_deductions_suffered: Decimal,
    /// Statutory sick pay reclaimed.
    pub ssp_reclaimed: Decimal,
    /// Statutory maternity pay reclaimed.
    pub smp_reclaimed: Decimal,
    /// Statutory paternity pay reclaimed.
    pub spp_reclaimed: Decimal,
    /// Statutory adoption pay reclaimed.
    pub sap_reclaimed: Decimal,
    /// The employer is claiming employment allowance.
    pub employment_allowance: bool,
    /// Apprenticeship levy due year to date.
    pub apprenticeship_levy: Decimal,
    /// Sum of all reclaimed amounts and CIS deductions.
    pub total_reclaimed: Decimal,
}

/// A stored filing document of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilingDocument {
    /// Payment-period filing.
    PeriodicPayment(PeriodicPaymentFiling),
    /// Period-adjustment filing.
    PeriodAdjustment(PeriodAdjustmentFiling),
}

impl FilingDocument {
    /// The document id.
    pub fn id(&self) -> Uuid {
        match self {
            FilingDocument::PeriodicPayment(doc) => doc.id,
            FilingDocument::PeriodAdjustment(doc) => doc.id,
        }
    }

    /// The owning submission, if linked.
    pub fn submission_id(&self) -> Option<Uuid> {
        match self {
            FilingDocument::PeriodicPayment(doc) => doc.submission_id,
            FilingDocument::PeriodAdjustment(doc) => doc.submission_id,
        }
    }

    /// Sets or clears the owning submission.
    pub fn set_submission_id(&mut self, submission_id: Option<Uuid>) {
        match self {
            FilingDocument::PeriodicPayment(doc) => doc.submission_id = submission_id,
            FilingDocument::PeriodAdjustment(doc) => doc.submission_id = submission_id,
        }
    }
}

impl From<PeriodicPaymentFiling> for FilingDocument {
    fn from(doc: PeriodicPaymentFiling) -> Self {
        FilingDocument::PeriodicPayment(doc)
    }
}

impl From<PeriodAdjustmentFiling> for FilingDocument {
    fn from(doc: PeriodAdjustmentFiling) -> Self {
        FilingDocument::PeriodAdjustment(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_adjustment() -> PeriodAdjustmentFiling {
        PeriodAdjustmentFiling {
            id: Uuid::new_v4(),
            submission_id: None,
            tax_year: "2024/2025".to_string(),
            tax_month: 2,
            employer_ref: "123/AB45678".to_string(),
            no_payment_for_period: false,
            cis_deductions_suffered: Decimal::ZERO,
            ssp_reclaimed: Decimal::new(12000, 2),
            smp_reclaimed: Decimal::ZERO,
            spp_reclaimed: Decimal::ZERO,
            sap_reclaimed: Decimal::ZERO,
            employment_allowance: true,
            apprenticeship_levy: Decimal::ZERO,
            total_reclaimed: Decimal::new(12000, 2),
        }
    }

    #[test]
    fn test_filing_document_is_tagged_by_kind() {
        let doc: FilingDocument = sample_adjustment().into();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["kind"], "period_adjustment");

        let parsed: FilingDocument = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_set_submission_id_links_document() {
        let mut doc: FilingDocument = sample_adjustment().into();
        assert!(doc.submission_id().is_none());

        let submission_id = Uuid::new_v4();
        doc.set_submission_id(Some(submission_id));
        assert_eq!(doc.submission_id(), Some(submission_id));

        doc.set_submission_id(None);
        assert!(doc.submission_id().is_none());
    }

    #[test]
    fn test_adjustment_input_defaults_to_unset() {
        let input: PeriodAdjustmentInput = serde_json::from_str("{}").unwrap();
        assert!(!input.no_payment_for_period);
        assert!(input.ssp_reclaimed.is_none());
        assert!(input.apprenticeship_levy.is_none());
    }
}
