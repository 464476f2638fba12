//! Compliance rules for RTI filings.
//!
//! This module contains the pure logic of the engine: tax period
//! arithmetic, field format validation, filing document construction and
//! the submission status machine.

mod filing_builder;
mod format_validation;
mod tax_period;
mod transitions;

pub use filing_builder::{
    FilingTotals, build_period_adjustment_filing, build_periodic_payment_filing,
    sum_worker_records,
};
pub use format_validation::{
    is_valid_ni_number, is_valid_tax_code, normalize_identifier, validate_period_adjustment,
    validate_worker_record,
};
pub use tax_period::{FISCAL_YEAR_START_MONTH, TaxPeriod, tax_month, tax_period, tax_year};
pub use transitions::{can_transition, transition};
