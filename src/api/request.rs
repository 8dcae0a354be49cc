//! Request types for the Payroll Engine API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TimeEntry;

/// Request body for `POST /pay-periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayPeriodRequest {
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive). Must be after `start_date`.
    pub end_date: NaiveDate,
}

/// Request body for `PUT /employees/:id/active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEmployeeActiveRequest {
    /// Whether the employee takes part in future payroll runs.
    pub is_active: bool,
}

/// Request body for `POST /employees/:id/time-entries`.
///
/// The employee comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeEntryRequest {
    /// The date worked.
    pub date_worked: NaiveDate,
    /// Hours worked that day, as a decimal string.
    pub hours_worked: Decimal,
}

impl CreateTimeEntryRequest {
    /// The entry this request records for `employee_id`.
    pub fn into_time_entry(self, employee_id: i64) -> TimeEntry {
        TimeEntry::new(employee_id, self.date_worked, self.hours_worked)
    }
}
