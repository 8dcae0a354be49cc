//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod pay_period;
mod payroll_record;
mod time_entry;

pub use employee::{Employee, EmploymentType, NewEmployee};
pub use pay_period::{PayPeriod, validate_range};
pub use payroll_record::{AuditStep, PayLine, PayrollRecord, PayrollRunSummary};
pub use time_entry::TimeEntry;
