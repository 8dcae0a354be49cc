//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that bounds the date window a payroll
//! run aggregates hours over, and records whether the period has been closed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Represents a pay period with its date range and processing state.
///
/// A period is *open* while `processed_at` is `None` and *closed* once a payroll run
/// has committed for it. Closed is terminal.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     1,
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
/// )
/// .unwrap();
///
/// assert!(!period.is_processed());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Unique identifier assigned by the store.
    pub id: i64,
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// When payroll was committed for this period, if it has been.
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl PayPeriod {
    /// Creates an open pay period, rejecting ranges where start is not before end.
    pub fn new(id: i64, start_date: NaiveDate, end_date: NaiveDate) -> PayrollResult<Self> {
        validate_range(start_date, end_date)?;
        Ok(Self {
            id,
            start_date,
            end_date,
            processed_at: None,
        })
    }

    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod::new(
    ///     1,
    ///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
    /// )
    /// .unwrap();
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())); // start date
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap())); // end date
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())); // before
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())); // after
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true once payroll has been committed for this period.
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }
}

/// Checks the `start < end` invariant shared by the model and the stores.
pub fn validate_range(start_date: NaiveDate, end_date: NaiveDate) -> PayrollResult<()> {
    if start_date >= end_date {
        return Err(PayrollError::InvalidPayPeriod {
            start_date,
            end_date,
            message: "start date must be before end date".to_string(),
        });
    }
    Ok(())
}
