//! Plain-text filing reports.
//!
//! [`render_report`] picks one layout per [`SubmissionType`]. Every type
//! produces a non-empty report; a submission whose filing document has
//! gone missing still gets its header plus a notice.

use rust_decimal::Decimal;

use crate::models::{
    FilingDocument, PeriodAdjustmentFiling, PeriodicPaymentFiling, Submission, SubmissionType,
};

const RULE_WIDTH: usize = 40;

/// Formats an amount as pounds with two decimal places.
///
/// # Example
///
/// ```
/// use rti_engine::report::money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(money(Decimal::new(5000, 0)), "£5000.00");
/// assert_eq!(money(Decimal::new(12345, 3)), "£12.35");
/// ```
pub fn money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    format!("£{}", rounded)
}

fn title(lines: &mut Vec<String>, text: &str) {
    lines.push(text.to_string());
    lines.push("=".repeat(RULE_WIDTH));
}

fn section(lines: &mut Vec<String>, text: &str) {
    lines.push(String::new());
    lines.push(text.to_string());
    lines.push("-".repeat(RULE_WIDTH));
}

fn submission_header(lines: &mut Vec<String>, submission: &Submission) {
    lines.push(format!("Employer Reference: {}", submission.employer_ref));
    lines.push(format!("Tax Year: {}", submission.tax_year));
    lines.push(format!("Tax Month: {}", submission.tax_month));
    lines.push(format!("Status: {}", submission.status));
    if let Some(reference) = &submission.gateway_reference {
        lines.push(format!("Gateway Reference: {}", reference));
    }
}

fn render_periodic_payment(filing: &PeriodicPaymentFiling) -> Vec<String> {
    let mut lines = Vec::new();
    title(&mut lines, "RTI FULL PAYMENT SUBMISSION");
    lines.push(format!("Employer Reference: {}", filing.employer_ref));
    lines.push(format!("Accounts Office Reference: {}", filing.accounts_office_ref));
    lines.push(format!("Tax Year: {}", filing.tax_year));
    lines.push(format!("Tax Month: {}", filing.tax_month));
    lines.push(format!("Payment Date: {}", filing.payment_date.format("%Y-%m-%d")));
    lines.push(format!("Employees: {}", filing.worker_records.len()));

    section(&mut lines, "SUMMARY");
    lines.push(format!("Total Payment: {}", money(filing.total_payment)));
    lines.push(format!("Total Tax: {}", money(filing.total_tax)));
    lines.push(format!("Total Employee NI: {}", money(filing.total_employee_ni)));
    lines.push(format!("Total Employer NI: {}", money(filing.total_employer_ni)));
    lines.push(format!("Total Student Loan: {}", money(filing.total_student_loan)));

    section(&mut lines, "EMPLOYEES");
    for record in &filing.worker_records {
        lines.push(record.full_name());
        lines.push(format!("  NI Number: {}", record.ni_number));
        lines.push(format!("  Tax Code: {}", record.tax_code));
        lines.push(format!("  Gross Pay: {}", money(record.gross_pay)));
        lines.push(format!("  Tax: {}", money(record.income_tax)));
        lines.push(format!("  NI: {}", money(record.employee_ni)));
        lines.push(String::new());
    }
    lines
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn render_period_adjustment(filing: &PeriodAdjustmentFiling) -> Vec<String> {
    let mut lines = Vec::new();
    title(&mut lines, "RTI EMPLOYER PAYMENT SUMMARY");
    lines.push(format!("Employer Reference: {}", filing.employer_ref));
    lines.push(format!("Tax Year: {}", filing.tax_year));
    lines.push(format!("Tax Month: {}", filing.tax_month));
    lines.push(format!("No Payment For Period: {}", yes_no(filing.no_payment_for_period)));
    lines.push(format!("Employment Allowance: {}", yes_no(filing.employment_allowance)));

    section(&mut lines, "RECLAIMS");
    lines.push(format!("CIS Deductions Suffered: {}", money(filing.cis_deductions_suffered)));
    lines.push(format!("SSP Reclaimed: {}", money(filing.ssp_reclaimed)));
    lines.push(format!("SMP Reclaimed: {}", money(filing.smp_reclaimed)));
    lines.push(format!("SPP Reclaimed: {}", money(filing.spp_reclaimed)));
    lines.push(format!("SAP Reclaimed: {}", money(filing.sap_reclaimed)));
    lines.push(format!("Total Reclaimed: {}", money(filing.total_reclaimed)));

    section(&mut lines, "LEVY");
    lines.push(format!("Apprenticeship Levy: {}", money(filing.apprenticeship_levy)));
    lines
}

fn render_employer_alignment(submission: &Submission) -> Vec<String> {
    let mut lines = Vec::new();
    title(&mut lines, "RTI EMPLOYER ALIGNMENT SUBMISSION");
    submission_header(&mut lines, submission);
    lines.push(format!("Employees: {}", submission.employees_count));

    section(&mut lines, "SUMMARY");
    lines.push(format!("Payroll Run: {}", submission.payroll_run_id));
    lines.push("Aligns the employer's worker list with the filing authority's records.".to_string());
    lines
}

fn render_nil_payment(submission: &Submission) -> Vec<String> {
    let mut lines = Vec::new();
    title(&mut lines, "RTI NIL PAYMENT SUBMISSION");
    submission_header(&mut lines, submission);

    section(&mut lines, "SUMMARY");
    lines.push(format!(
        "No payments were made to employees in tax month {} of {}.",
        submission.tax_month, submission.tax_year
    ));
    lines
}

fn render_missing_document(submission: &Submission) -> Vec<String> {
    let mut lines = Vec::new();
    title(
        &mut lines,
        &format!("RTI SUBMISSION ({})", submission.submission_type),
    );
    submission_header(&mut lines, submission);
    lines.push(String::new());
    lines.push("Filing data not found for this submission.".to_string());
    lines
}

/// Renders a plain-text report for a submission.
///
/// `document` is the submission's filing document, if it has one.
///
/// # Example
///
/// ```
/// use rti_engine::models::{Submission, SubmissionStatus, SubmissionType};
/// use rti_engine::report::render_report;
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let submission = Submission {
///     id: Uuid::new_v4(),
///     submission_type: SubmissionType::NilPayment,
///     tax_year: "2024/2025".to_string(),
///     tax_month: 3,
///     status: SubmissionStatus::Draft,
///     created_date: Utc::now(),
///     submitted_date: None,
///     accepted_date: None,
///     payroll_run_id: "run_007".to_string(),
///     filing_document_id: None,
///     employer_ref: "123/AB45678".to_string(),
///     employees_count: 0,
///     total_payment: Decimal::ZERO,
///     total_tax: Decimal::ZERO,
///     total_ni: Decimal::ZERO,
///     gateway_reference: None,
///     errors: vec![],
///     warnings: vec![],
///     version: 0,
/// };
///
/// let report = render_report(&submission, None);
/// assert!(report.starts_with("RTI NIL PAYMENT SUBMISSION"));
/// ```
pub fn render_report(submission: &Submission, document: Option<&FilingDocument>) -> String {
    let lines = match (submission.submission_type, document) {
        (SubmissionType::PeriodicPayment, Some(FilingDocument::PeriodicPayment(filing))) => {
            render_periodic_payment(filing)
        }
        (SubmissionType::PeriodAdjustment, Some(FilingDocument::PeriodAdjustment(filing))) => {
            render_period_adjustment(filing)
        }
        (SubmissionType::EmployerAlignment, _) => render_employer_alignment(submission),
        (SubmissionType::NilPayment, _) => render_nil_payment(submission),
        (SubmissionType::PeriodicPayment | SubmissionType::PeriodAdjustment, _) => {
            render_missing_document(submission)
        }
    };

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
