//! Employee model and related types.
//!
//! This module defines the Employee struct and EmploymentType enum
//! for representing workers that payroll runs are computed for.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment.
    FullTime,
    /// Part-time employment.
    PartTime,
    /// Casual employment.
    Casual,
}

impl EmploymentType {
    /// Returns the snake_case name used in storage and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Casual => "casual",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(EmploymentType::FullTime),
            "part_time" => Ok(EmploymentType::PartTime),
            "casual" => Ok(EmploymentType::Casual),
            other => Err(PayrollError::InvalidEmployee {
                field: "employment_type".to_string(),
                message: format!("unknown employment type '{}'", other),
            }),
        }
    }
}

/// Represents a stored employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier assigned by the store.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Department the employee works in.
    pub department: String,
    /// The type of employment arrangement.
    pub employment_type: EmploymentType,
    /// Hourly rate of pay. Never negative.
    pub hourly_rate: Decimal,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// Only active employees are paid by a payroll run.
    pub is_active: bool,
}

impl Employee {
    /// Returns "first last".
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmploymentType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: 1,
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Lovelace".to_string(),
    ///     department: "Engineering".to_string(),
    ///     employment_type: EmploymentType::FullTime,
    ///     hourly_rate: Decimal::new(4250, 2),
    ///     hire_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
    ///     is_active: true,
    /// };
    /// assert_eq!(employee.full_name(), "Ada Lovelace");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Department the employee works in.
    #[serde(default)]
    pub department: String,
    /// The type of employment arrangement.
    pub employment_type: EmploymentType,
    /// Hourly rate of pay.
    pub hourly_rate: Decimal,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// Whether the employee starts out active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewEmployee {
    /// Checks the fields a store must reject before inserting.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(PayrollError::InvalidEmployee {
                field: "first_name".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(PayrollError::InvalidEmployee {
                field: "last_name".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.hourly_rate < Decimal::ZERO {
            return Err(PayrollError::InvalidEmployee {
                field: "hourly_rate".to_string(),
                message: format!("must not be negative, got {}", self.hourly_rate),
            });
        }
        Ok(())
    }

    /// Attaches a store-assigned identifier.
    pub fn into_employee(self, id: i64) -> Employee {
        Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            department: self.department,
            employment_type: self.employment_type,
            hourly_rate: self.hourly_rate,
            hire_date: self.hire_date,
            is_active: self.is_active,
        }
    }
}
