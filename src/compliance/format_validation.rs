//! Field format rules for RTI filings.
//!
//! Every rule runs on every record; a single pass can report several
//! errors and warnings for the same worker.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{Issue, PeriodAdjustmentFiling, ValidationResult, WorkerPayRecord};

/// NI number: two prefix letters, six digits, suffix A-D.
///
/// The first letter may not be D, F, I, Q, U or V. The second may not be
/// D, F, I, O, Q, U or V.
static NI_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-CEGHJ-PR-TW-Z][A-CEGHJ-NPR-TW-Z][0-9]{6}[A-D]$")
        .expect("NI number pattern is valid")
});

/// Tax code: allowance codes, fixed codes, D codes and K codes.
static TAX_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]{1,6}[LMNPTY]|BR|0T|NT|D[0-8]|K[0-9]{1,6})$")
        .expect("tax code pattern is valid")
});

/// Upper-cases an identifier and removes all whitespace.
///
/// Filing documents store NI numbers and tax codes in this form, so the
/// value that is validated is the value that is filed.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::normalize_identifier;
///
/// assert_eq!(normalize_identifier("ab 12 34 56 c"), "AB123456C");
/// assert_eq!(normalize_identifier(" 1257l "), "1257L");
/// ```
pub fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Returns true if `ni_number` is a well-formed National Insurance number:
/// exactly nine characters, upper case, no spaces.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::is_valid_ni_number;
///
/// assert!(is_valid_ni_number("AB123456C"));
/// assert!(!is_valid_ni_number("ab 12 34 56 c"));
/// assert!(!is_valid_ni_number("QQ123456C"));
/// assert!(!is_valid_ni_number("123456789"));
/// ```
pub fn is_valid_ni_number(ni_number: &str) -> bool {
    NI_NUMBER.is_match(ni_number)
}

/// Returns true if `tax_code` is a recognised PAYE tax code.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::is_valid_tax_code;
///
/// assert!(is_valid_tax_code("1257L"));
/// assert!(is_valid_tax_code("K500"));
/// assert!(is_valid_tax_code("BR"));
/// assert!(!is_valid_tax_code("1257Z"));
/// assert!(!is_valid_tax_code("1257l"));
/// ```
pub fn is_valid_tax_code(tax_code: &str) -> bool {
    TAX_CODE.is_match(tax_code)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validates a single worker pay record.
///
/// # Rules
///
/// | Code | Severity | Condition |
/// |------|----------|-----------|
/// | `INVALID_NI` | error | NI number does not match the standard format |
/// | `INVALID_TAX_CODE` | error | tax code is not a recognised code |
/// | `MISSING_FIRST_NAME` | error | first name is blank |
/// | `MISSING_LAST_NAME` | error | last name is blank |
/// | `MISSING_DOB` | error | date of birth is absent |
/// | `MISSING_POSTCODE` | error | postcode is blank |
/// | `NEGATIVE_PAY` | error | gross pay below zero |
/// | `NEGATIVE_TAX` | error | income tax below zero |
/// | `TAXABLE_EXCEEDS_GROSS` | warning | taxable gross above gross pay |
/// | `MISSING_LOAN_PLAN` | warning | student loan without a plan type |
///
/// # Example
///
/// ```
/// use rti_engine::compliance::validate_worker_record;
/// use rti_engine::models::WorkerPayRecord;
///
/// let record = WorkerPayRecord {
///     ni_number: "AB123456C".to_string(),
///     tax_code: "1257L".to_string(),
///     ..Default::default()
/// };
///
/// let result = validate_worker_record(&record);
/// assert!(!result.can_submit);
/// let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
/// assert_eq!(codes, ["MISSING_FIRST_NAME", "MISSING_LAST_NAME", "MISSING_DOB", "MISSING_POSTCODE"]);
/// ```
pub fn validate_worker_record(record: &WorkerPayRecord) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !is_valid_ni_number(&record.ni_number) {
        errors.push(Issue::error(
            "INVALID_NI",
            format!(
                "National Insurance number '{}' is not in a valid format",
                record.ni_number
            ),
            "ni_number",
        ));
    }

    if !is_valid_tax_code(&record.tax_code) {
        errors.push(Issue::error(
            "INVALID_TAX_CODE",
            format!("Tax code '{}' is not a recognised code", record.tax_code),
            "tax_code",
        ));
    }

    if is_blank(&record.first_name) {
        errors.push(Issue::error(
            "MISSING_FIRST_NAME",
            "First name is required",
            "first_name",
        ));
    }

    if is_blank(&record.last_name) {
        errors.push(Issue::error(
            "MISSING_LAST_NAME",
            "Last name is required",
            "last_name",
        ));
    }

    if record.date_of_birth.is_none() {
        errors.push(Issue::error(
            "MISSING_DOB",
            "Date of birth is required",
            "date_of_birth",
        ));
    }

    if is_blank(&record.address.postcode) {
        errors.push(Issue::error(
            "MISSING_POSTCODE",
            "Postcode is required",
            "address.postcode",
        ));
    }

    if record.gross_pay < Decimal::ZERO {
        errors.push(Issue::error(
            "NEGATIVE_PAY",
            format!("Gross pay cannot be negative (got {})", record.gross_pay),
            "gross_pay",
        ));
    }

    if record.income_tax < Decimal::ZERO {
        errors.push(Issue::error(
            "NEGATIVE_TAX",
            format!("Income tax cannot be negative (got {})", record.income_tax),
            "income_tax",
        ));
    }

    if let Some(taxable) = record.taxable_gross_pay {
        if taxable > record.gross_pay {
            warnings.push(Issue::warning(
                "TAXABLE_EXCEEDS_GROSS",
                format!(
                    "Taxable pay {} exceeds gross pay {}",
                    taxable, record.gross_pay
                ),
                "taxable_gross_pay",
            ));
        }
    }

    if record.student_loan.is_some() && record.student_loan_plan.is_none() {
        warnings.push(Issue::warning(
            "MISSING_LOAN_PLAN",
            "Student loan deduction has no plan type",
            "student_loan_plan",
        ));
    }

    ValidationResult::from_issues(errors, warnings)
}

/// Validates the figures on a period adjustment filing.
///
/// Each negative reclaim, deduction or levy amount is a `NEGATIVE_AMOUNT`
/// error naming the field.
pub fn validate_period_adjustment(filing: &PeriodAdjustmentFiling) -> ValidationResult {
    let amounts = [
        ("cis_deductions_suffered", filing.cis_deductions_suffered),
        ("ssp_reclaimed", filing.ssp_reclaimed),
        ("smp_reclaimed", filing.smp_reclaimed),
        ("spp_reclaimed", filing.spp_reclaimed),
        ("sap_reclaimed", filing.sap_reclaimed),
        ("apprenticeship_levy", filing.apprenticeship_levy),
    ];

    let errors = amounts
        .iter()
        .filter(|(_, amount)| *amount < Decimal::ZERO)
        .map(|(field, amount)| {
            Issue::error(
                "NEGATIVE_AMOUNT",
                format!("{} cannot be negative (got {})", field, amount),
                *field,
            )
        })
        .collect();

    ValidationResult::from_issues(errors, Vec::new())
}
