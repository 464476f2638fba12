//! Tax period arithmetic.
//!
//! The UK fiscal year runs from April to March. These functions map a
//! calendar date to its fiscal year label and fiscal month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The first calendar month of the fiscal year.
pub const FISCAL_YEAR_START_MONTH: u32 = 4;

/// A fiscal year and month pair.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::{tax_period, TaxPeriod};
/// use chrono::NaiveDate;
///
/// let period = tax_period(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
/// assert_eq!(period, TaxPeriod { tax_year: "2024/2025".to_string(), tax_month: 1 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxPeriod {
    /// Fiscal year label, e.g. "2024/2025".
    pub tax_year: String,
    /// Fiscal month, 1 (April) to 12 (March).
    pub tax_month: u32,
}

impl std::fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} month {}", self.tax_year, self.tax_month)
    }
}

/// Returns the fiscal month (1..=12) for a date.
///
/// April is month 1 and March is month 12.
///
/// # Example
///
/// ```
/// use rti_engine::compliance::tax_month;
/// use chrono::NaiveDate;
///
/// assert_eq!(tax_month(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()), 1);
/// assert_eq!(tax_month(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()), 12);
/// ```
pub fn tax_month(date: NaiveDate) -> u32 {
    let month = date.month();
    if month >= FISCAL_YEAR_START_MONTH {
        month - 3
    } else {
        month + 9
    }
}

/// Returns the fiscal year label for a date, e.g. "2024/2025".
///
/// # Example
///
/// ```
/// use rti_engine::compliance::tax_year;
/// use chrono::NaiveDate;
///
/// assert_eq!(tax_year(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()), "2024/2025");
/// assert_eq!(tax_year(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()), "2023/2024");
/// ```
pub fn tax_year(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= FISCAL_YEAR_START_MONTH {
        format!("{}/{}", year, year + 1)
    } else {
        format!("{}/{}", year - 1, year)
    }
}

/// Returns both the fiscal year and month for a date.
pub fn tax_period(date: NaiveDate) -> TaxPeriod {
    TaxPeriod {
        tax_year: tax_year(date),
        tax_month: tax_month(date),
    }
}
