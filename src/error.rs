//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while recording work and running payroll.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// Every payroll run failure is surfaced verbatim to the caller through this type.
/// Nothing is retried automatically: a payroll run is an explicit operator action and
/// a silent retry could pay someone twice.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::PayPeriodNotFound { id: 7 };
/// assert_eq!(error.to_string(), "Pay period not found: 7");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// The requested pay period does not exist.
    #[error("Pay period not found: {id}")]
    PayPeriodNotFound {
        /// The pay period identifier that was looked up.
        id: i64,
    },

    /// The requested employee does not exist.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee identifier that was looked up.
        id: i64,
    },

    /// The pay period has already been processed and is closed.
    #[error("Pay period {id} has already been processed at {processed_at}")]
    AlreadyProcessed {
        /// The pay period identifier.
        id: i64,
        /// When the period was closed.
        processed_at: DateTime<Utc>,
    },

    /// A payroll record already exists for the employee and pay period.
    #[error("Payroll record already exists for employee {employee_id} in pay period {pay_period_id}")]
    DuplicateRecord {
        /// The employee identifier.
        employee_id: i64,
        /// The pay period identifier.
        pay_period_id: i64,
    },

    /// The final processed stamp did not affect exactly one pay period.
    #[error("Failed to mark pay period {pay_period_id} as processed: {rows_affected} rows affected")]
    CommitFailure {
        /// The pay period identifier.
        pay_period_id: i64,
        /// How many rows the stamp actually touched.
        rows_affected: usize,
    },

    /// Hours or pay for an employee exceeded what a `Decimal` can represent.
    #[error("Pay for employee {employee_id} cannot be represented: {message}")]
    PayOverflow {
        /// The employee whose figures overflowed.
        employee_id: i64,
        /// Which quantity overflowed.
        message: String,
    },

    /// A pay period date range was invalid.
    #[error("Invalid pay period {start_date} to {end_date}: {message}")]
    InvalidPayPeriod {
        /// The requested start date.
        start_date: NaiveDate,
        /// The requested end date.
        end_date: NaiveDate,
        /// A description of what made the range invalid.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A time entry was invalid.
    #[error("Invalid time entry for employee {employee_id} on {date}: {message}")]
    InvalidTimeEntry {
        /// The employee the entry belongs to.
        employee_id: i64,
        /// The date worked.
        date: NaiveDate,
        /// A description of what made the entry invalid.
        message: String,
    },

    /// A time entry already exists for the employee on that date.
    #[error("Time entry already exists for employee {employee_id} on {date}")]
    DuplicateTimeEntry {
        /// The employee the entry belongs to.
        employee_id: i64,
        /// The date worked.
        date: NaiveDate,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration value '{field}': {message}")]
    ConfigInvalid {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// The underlying storage failed for infrastructure reasons.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
