//! Storage for employees, time entries, pay periods and payroll records.
//!
//! A payroll run talks to storage only through [`PayrollTransaction`], obtained from
//! [`PayrollStore::begin`]. Everything a run writes becomes visible on
//! [`PayrollTransaction::commit`]; dropping the transaction instead discards it.
//!
//! Two backends are provided:
//! - [`SqlitePayrollStore`], the persistent store used by the service.
//! - [`InMemoryPayrollStore`], used by tests and benchmarks.

mod memory;
mod sqlite;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::PayrollResult;
use crate::models::{Employee, NewEmployee, PayPeriod, PayrollRecord, TimeEntry};

pub use memory::{InMemoryPayrollStore, InMemoryTransaction};
pub use sqlite::{SqlitePayrollStore, SqliteTransaction};

/// The reads and writes one payroll run performs, scoped to a single transaction.
pub trait PayrollTransaction {
    /// Fetches a pay period, or `None` if it does not exist.
    fn pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>>;

    /// Fetches every employee whose active flag is set, ordered by id.
    fn active_employees(&self) -> PayrollResult<Vec<Employee>>;

    /// Sums an employee's hours dated within `[start, end]`, inclusive. Zero if none.
    fn sum_hours_worked(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Decimal>;

    /// Inserts a payroll record.
    ///
    /// Fails with `DuplicateRecord` if one already exists for the same employee and
    /// pay period.
    fn insert_payroll_record(&mut self, record: &PayrollRecord) -> PayrollResult<()>;

    /// Stamps an open pay period as processed and returns how many periods changed.
    ///
    /// A missing or already-processed period yields zero.
    fn mark_period_processed(&mut self, id: i64, processed_at: DateTime<Utc>)
    -> PayrollResult<usize>;

    /// Makes every write of this transaction durable and visible.
    fn commit(self) -> PayrollResult<()>;
}

/// A store of payroll data.
pub trait PayrollStore {
    /// The transaction type handed to payroll runs.
    type Transaction<'a>: PayrollTransaction
    where
        Self: 'a;

    /// Opens a transaction. Backends that can serialize writers take the write lock here.
    fn begin(&mut self) -> PayrollResult<Self::Transaction<'_>>;

    /// Stores a new employee and returns it with its assigned id.
    fn add_employee(&mut self, employee: NewEmployee) -> PayrollResult<Employee>;

    /// Activates or deactivates an employee. `EmployeeNotFound` if the id is unknown.
    fn set_employee_active(&mut self, id: i64, is_active: bool) -> PayrollResult<()>;

    /// Records hours worked. `DuplicateTimeEntry` if the employee already has an entry
    /// for that date, `EmployeeNotFound` if the employee is unknown.
    fn add_time_entry(&mut self, entry: TimeEntry) -> PayrollResult<()>;

    /// Creates an open pay period. `InvalidPayPeriod` unless `start < end`.
    fn add_pay_period(&mut self, start: NaiveDate, end: NaiveDate) -> PayrollResult<PayPeriod>;

    /// Deletes a pay period together with its payroll records.
    fn remove_pay_period(&mut self, id: i64) -> PayrollResult<()>;

    /// Fetches a pay period outside of any run.
    fn get_pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>>;

    /// Payroll records written for a pay period, ordered by employee id.
    fn payroll_for_period(&self, pay_period_id: i64) -> PayrollResult<Vec<PayrollRecord>>;

    /// Payroll records for an employee, ordered by pay period start date.
    fn payroll_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<PayrollRecord>>;

    /// Time entries for an employee, ordered by date.
    fn time_entries_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<TimeEntry>>;
}
