//! Worker pay record and related types.
//!
//! A [`WorkerPayRecord`] is one worker's pay, tax and NI detail for a
//! period, as produced by the upstream payroll run. Every field has a
//! serde default so that a partial record can still be parsed and
//! validated.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gender as reported to the filing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// Student loan repayment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLoanPlan {
    /// Plan 1.
    Plan1,
    /// Plan 2.
    Plan2,
    /// Plan 4 (Scotland).
    Plan4,
    /// Postgraduate loan.
    Postgraduate,
}

/// How the worker was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer (BACS).
    #[default]
    Bacs,
    /// Cheque.
    Cheque,
    /// Cash.
    Cash,
    /// Any other method.
    Other,
}

/// How often the worker is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Every week.
    Weekly,
    /// Every two weeks.
    Fortnightly,
    /// Every four weeks.
    FourWeekly,
    /// Every calendar month.
    #[default]
    Monthly,
    /// Every quarter.
    Quarterly,
    /// Once a year.
    Annually,
}

/// New starter checklist statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarterDeclaration {
    /// First job since 6 April, no taxable benefits.
    A,
    /// Only job now, but had another since 6 April.
    B,
    /// Has another job or pension.
    C,
}

/// Postal address of a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Street lines, most specific first.
    pub lines: Vec<String>,
    /// Postcode.
    pub postcode: String,
}

/// One worker's pay and deductions for a tax period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPayRecord {
    /// Payroll reference for the worker.
    pub worker_ref: String,
    /// National Insurance number, e.g. "AB123456C".
    pub ni_number: String,
    /// Forename.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Postal address.
    pub address: Address,
    /// PAYE tax code, e.g. "1257L".
    pub tax_code: String,
    /// NI category letter.
    pub ni_category: String,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Pay subject to income tax, if different from gross.
    pub taxable_gross_pay: Option<Decimal>,
    /// Income tax deducted.
    pub income_tax: Decimal,
    /// Employee National Insurance contribution.
    pub employee_ni: Decimal,
    /// Employer National Insurance contribution.
    pub employer_ni: Decimal,
    /// Student loan deduction.
    pub student_loan: Option<Decimal>,
    /// Student loan plan type.
    pub student_loan_plan: Option<StudentLoanPlan>,
    /// Pension contribution deducted.
    pub pension_contribution: Option<Decimal>,
    /// How the worker was paid.
    pub payment_method: PaymentMethod,
    /// How often the worker is paid.
    pub pay_frequency: PayFrequency,
    /// Hours worked in the period.
    pub hours_worked: Option<Decimal>,
    /// Date the worker left, if they left in this period.
    pub leaving_date: Option<NaiveDate>,
    /// New starter declaration, for workers starting this period.
    pub starter_declaration: Option<StarterDeclaration>,
}

impl WorkerPayRecord {
    /// Returns the worker's display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use rti_engine::models::WorkerPayRecord;
    ///
    /// let record = WorkerPayRecord {
    ///     first_name: "Jane".to_string(),
    ///     last_name: "Smith".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(record.full_name(), "Jane Smith");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Student loan deduction, zero when absent.
    pub fn student_loan_or_zero(&self) -> Decimal {
        self.student_loan.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "worker_ref": "wrk_001",
            "ni_number": "AB123456C",
            "first_name": "Jane",
            "last_name": "Smith",
            "date_of_birth": "1985-03-15",
            "gender": "female",
            "address": { "lines": ["1 High Street", "Leeds"], "postcode": "LS1 1AA" },
            "tax_code": "1257L",
            "ni_category": "A",
            "gross_pay": "2000.00",
            "taxable_gross_pay": "1900.00",
            "income_tax": "200.00",
            "employee_ni": "100.00",
            "employer_ni": "150.00",
            "student_loan": "45.00",
            "student_loan_plan": "plan2",
            "payment_method": "bacs",
            "pay_frequency": "monthly",
            "starter_declaration": "A"
        }"#;

        let record: WorkerPayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.worker_ref, "wrk_001");
        assert_eq!(record.gender, Some(Gender::Female));
        assert_eq!(record.address.postcode, "LS1 1AA");
        assert_eq!(record.gross_pay, Decimal::from_str("2000.00").unwrap());
        assert_eq!(record.student_loan_plan, Some(StudentLoanPlan::Plan2));
        assert_eq!(record.starter_declaration, Some(StarterDeclaration::A));
    }

    #[test]
    fn test_deserialize_partial_record_uses_defaults() {
        let record: WorkerPayRecord = serde_json::from_str(r#"{"ni_number": "AB123456C"}"#).unwrap();
        assert_eq!(record.ni_number, "AB123456C");
        assert!(record.first_name.is_empty());
        assert!(record.date_of_birth.is_none());
        assert_eq!(record.gross_pay, Decimal::ZERO);
        assert_eq!(record.pay_frequency, PayFrequency::Monthly);
        assert_eq!(record.payment_method, PaymentMethod::Bacs);
    }

    #[test]
    fn test_student_loan_or_zero() {
        let mut record = WorkerPayRecord::default();
        assert_eq!(record.student_loan_or_zero(), Decimal::ZERO);

        record.student_loan = Some(Decimal::new(4500, 2));
        assert_eq!(record.student_loan_or_zero(), Decimal::new(4500, 2));
    }

    #[test]
    fn test_full_name_with_missing_last_name() {
        let record = WorkerPayRecord {
            first_name: "Jane".to_string(),
            ..Default::default()
        };
        assert_eq!(record.full_name(), "Jane");
    }

    #[test]
    fn test_pay_frequency_serialization() {
        assert_eq!(
            serde_json::to_string(&PayFrequency::FourWeekly).unwrap(),
            "\"four_weekly\""
        );
    }
}
