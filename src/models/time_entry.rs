//! Recorded work hours.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Hours an employee worked on one day.
///
/// A store keeps at most one entry per (employee, date). Entries are not checked
/// against the employee's hire date; that is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// The employee who worked.
    pub employee_id: i64,
    /// The date worked.
    pub date_worked: NaiveDate,
    /// Hours worked on that date.
    pub hours_worked: Decimal,
}

impl TimeEntry {
    /// Creates a time entry.
    pub fn new(employee_id: i64, date_worked: NaiveDate, hours_worked: Decimal) -> Self {
        Self {
            employee_id,
            date_worked,
            hours_worked,
        }
    }

    /// Rejects negative hours.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.hours_worked < Decimal::ZERO {
            return Err(PayrollError::InvalidTimeEntry {
                employee_id: self.employee_id,
                date: self.date_worked,
                message: format!("hours worked must not be negative, got {}", self.hours_worked),
            });
        }
        Ok(())
    }
}
