//! Filing document construction.
//!
//! Builders are pure: they derive the tax period, sum the worker figures
//! and return a new document. Persisting the document and creating its
//! submission is the job of [`crate::lifecycle::SubmissionManager`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::EmployerConfig;
use crate::models::{
    PeriodAdjustmentFiling, PeriodAdjustmentInput, PeriodicPaymentFiling, WorkerPayRecord,
};

use super::format_validation::normalize_identifier;
use super::tax_period::tax_period;

/// Aggregate totals over a set of worker records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilingTotals {
    /// Sum of gross pay.
    pub payment: Decimal,
    /// Sum of income tax.
    pub tax: Decimal,
    /// Sum of employee NI.
    pub employee_ni: Decimal,
    /// Sum of employer NI.
    pub employer_ni: Decimal,
    /// Sum of student loan deductions, absent values counted as zero.
    pub student_loan: Decimal,
}

/// Sums the pay figures across worker records.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::sum_worker_records;
/// use rti_engine::models::WorkerPayRecord;
/// use rust_decimal::Decimal;
///
/// let records = vec![
///     WorkerPayRecord { gross_pay: Decimal::new(2000, 0), ..Default::default() },
///     WorkerPayRecord { gross_pay: Decimal::new(3000, 0), ..Default::default() },
/// ];
/// assert_eq!(sum_worker_records(&records).payment, Decimal::new(5000, 0));
/// ```
pub fn sum_worker_records(records: &[WorkerPayRecord]) -> FilingTotals {
    records
        .iter()
        .fold(FilingTotals::default(), |totals, record| FilingTotals {
            payment: totals.payment + record.gross_pay,
            tax: totals.tax + record.income_tax,
            employee_ni: totals.employee_ni + record.employee_ni,
            employer_ni: totals.employer_ni + record.employer_ni,
            student_loan: totals.student_loan + record.student_loan_or_zero(),
        })
}

/// Builds a periodic payment filing from a payroll run's worker records.
///
/// The tax period is derived from `payment_date`. NI numbers and tax codes
/// are stored normalised (upper case, no whitespace). The returned document
/// is not yet linked to a submission.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::build_periodic_payment_filing;
/// use rti_engine::config::EmployerConfig;
/// use rti_engine::models::WorkerPayRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employer = EmployerConfig {
///     employer_ref: "123/AB45678".to_string(),
///     accounts_office_ref: "123PA00045678".to_string(),
/// };
/// let records = vec![WorkerPayRecord {
///     gross_pay: Decimal::new(200000, 2),
///     income_tax: Decimal::new(20000, 2),
///     ..Default::default()
/// }];
///
/// let filing = build_periodic_payment_filing(
///     "run_001",
///     records,
///     NaiveDate::from_ymd_opt(2024, 4, 25).unwrap(),
///     &employer,
/// );
/// assert_eq!(filing.tax_year, "2024/2025");
/// assert_eq!(filing.tax_month, 1);
/// assert_eq!(filing.total_payment, Decimal::new(200000, 2));
/// assert!(filing.submission_id.is_none());
/// ```
pub fn build_periodic_payment_filing(
    payroll_run_id: &str,
    worker_records: Vec<WorkerPayRecord>,
    payment_date: NaiveDate,
    employer: &EmployerConfig,
) -> PeriodicPaymentFiling {
    let period = tax_period(payment_date);
    let totals = sum_worker_records(&worker_records);
    let worker_records = worker_records
        .into_iter()
        .map(|mut record| {
            record.ni_number = normalize_identifier(&record.ni_number);
            record.tax_code = normalize_identifier(&record.tax_code);
            record
        })
        .collect();

    PeriodicPaymentFiling {
        id: Uuid::new_v4(),
        submission_id: None,
        payroll_run_id: payroll_run_id.to_string(),
        tax_year: period.tax_year,
        tax_month: period.tax_month,
        payment_date,
        employer_ref: employer.employer_ref.clone(),
        accounts_office_ref: employer.accounts_office_ref.clone(),
        worker_records,
        total_payment: totals.payment,
        total_tax: totals.tax,
        total_employee_ni: totals.employee_ni,
        total_employer_ni: totals.employer_ni,
        total_student_loan: totals.student_loan,
    }
}

/// Builds a period adjustment filing.
///
/// Unset figures default to zero. `total_reclaimed` is the sum of the
/// four statutory reclaims and CIS deductions suffered.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::build_period_adjustment_filing;
/// use rti_engine::config::EmployerConfig;
/// use rti_engine::models::PeriodAdjustmentInput;
/// use rust_decimal::Decimal;
///
/// let employer = EmployerConfig {
///     employer_ref: "123/AB45678".to_string(),
///     accounts_office_ref: "123PA00045678".to_string(),
/// };
/// let input = PeriodAdjustmentInput {
///     ssp_reclaimed: Some(Decimal::new(100, 0)),
///     smp_reclaimed: Some(Decimal::new(50, 0)),
///     ..Default::default()
/// };
///
/// let filing = build_period_adjustment_filing("2024/2025", 3, input, &employer);
/// assert_eq!(filing.spp_reclaimed, Decimal::ZERO);
/// assert_eq!(filing.total_reclaimed, Decimal::new(150, 0));
/// ```
pub fn build_period_adjustment_filing(
    tax_year: &str,
    tax_month: u32,
    input: PeriodAdjustmentInput,
    employer: &EmployerConfig,
) -> PeriodAdjustmentFiling {
    let cis = input.cis_deductions_suffered.unwrap_or(Decimal::ZERO);
    let ssp = input.ssp_reclaimed.unwrap_or(Decimal::ZERO);
    let smp = input.smp_reclaimed.unwrap_or(Decimal::ZERO);
    let spp = input.spp_reclaimed.unwrap_or(Decimal::ZERO);
    let sap = input.sap_reclaimed.unwrap_or(Decimal::ZERO);

    PeriodAdjustmentFiling {
        id: Uuid::new_v4(),
        submission_id: None,
        tax_year: tax_year.to_string(),
        tax_month,
        employer_ref: employer.employer_ref.clone(),
        no_payment_for_period: input.no_payment_for_period,
        cis_deductions_suffered: cis,
        ssp_reclaimed: ssp,
        smp_reclaimed: smp,
        spp_reclaimed: spp,
        sap_reclaimed: sap,
        employment_allowance: input.employment_allowance,
        apprenticeship_levy: input.apprenticeship_levy.unwrap_or(Decimal::ZERO),
        total_reclaimed: ssp + smp + spp + sap + cis,
    }
}
