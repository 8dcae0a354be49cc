//! SQLite-backed payroll store.
//!
//! Monetary amounts and hours are stored as decimal TEXT so they round-trip exactly.
//! Dates are ISO-8601 TEXT, which keeps `BETWEEN` comparisons correct.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction, TransactionBehavior, ffi, params,
};
use rust_decimal::Decimal;
use tracing::debug;

use super::{PayrollStore, PayrollTransaction};
use crate::config::DatabaseConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    Employee, EmploymentType, NewEmployee, PayPeriod, PayrollRecord, TimeEntry, validate_range,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    department TEXT NOT NULL DEFAULT '',
    employment_type TEXT NOT NULL,
    hourly_rate TEXT NOT NULL,
    hire_date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS time_entries (
    id INTEGER PRIMARY KEY,
    employee_id INTEGER NOT NULL,
    date_worked TEXT NOT NULL,
    hours_worked TEXT NOT NULL,
    UNIQUE(employee_id, date_worked),
    FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS pay_periods (
    id INTEGER PRIMARY KEY,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    processed_at TEXT,
    CHECK(start_date < end_date)
);

CREATE TABLE IF NOT EXISTS payroll (
    id INTEGER PRIMARY KEY,
    employee_id INTEGER NOT NULL,
    pay_period_id INTEGER NOT NULL,
    gross_pay TEXT NOT NULL,
    net_pay TEXT NOT NULL,
    UNIQUE(employee_id, pay_period_id),
    FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE,
    FOREIGN KEY(pay_period_id) REFERENCES pay_periods(id) ON DELETE CASCADE
);
";

const EMPLOYEE_COLUMNS: &str =
    "id, first_name, last_name, department, employment_type, hourly_rate, hire_date, is_active";

/// A payroll store persisted in a SQLite database.
///
/// Runs execute inside a `BEGIN IMMEDIATE` transaction, so the write lock is held from
/// the processed check through the final stamp. Two processes running the same period
/// against one database file serialize on that lock and the second one finds the
/// period already processed.
#[derive(Debug)]
pub struct SqlitePayrollStore {
    conn: Connection,
}

impl SqlitePayrollStore {
    /// Opens or creates the database at `path` and ensures the tables exist.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> PayrollResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(busy_timeout)?;
        conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
        Self::initialize(conn)
    }

    /// Opens the database described by the configuration.
    pub fn from_config(config: &DatabaseConfig) -> PayrollResult<Self> {
        Self::open(&config.path, Duration::from_secs(config.busy_timeout_secs))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> PayrollResult<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> PayrollResult<Self> {
        conn.execute("PRAGMA foreign_keys=ON;", [])?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

/// A payroll run's view of a [`SqlitePayrollStore`]. Rolls back on drop.
pub struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl PayrollTransaction for SqliteTransaction<'_> {
    fn pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
        fetch_pay_period(&self.tx, id)
    }

    fn active_employees(&self) -> PayrollResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE is_active = 1 ORDER BY id ASC",
            EMPLOYEE_COLUMNS
        );
        let mut stmt = self.tx.prepare_cached(&sql)?;
        let employees = stmt
            .query_map([], employee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }

    fn sum_hours_worked(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Decimal> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT hours_worked FROM time_entries \
             WHERE employee_id = ?1 AND date_worked BETWEEN ?2 AND ?3",
        )?;
        let rows = stmt.query_map(params![employee_id, start, end], |row| {
            decimal_column(row, 0)
        })?;

        let mut total = Decimal::ZERO;
        for hours in rows {
            total = total
                .checked_add(hours?)
                .ok_or_else(|| PayrollError::PayOverflow {
                    employee_id,
                    message: format!("hours worked between {} and {} overflowed", start, end),
                })?;
        }
        Ok(total)
    }

    fn insert_payroll_record(&mut self, record: &PayrollRecord) -> PayrollResult<()> {
        let result = self.tx.execute(
            "INSERT INTO payroll (employee_id, pay_period_id, gross_pay, net_pay) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.employee_id,
                record.pay_period_id,
                record.gross_pay.to_string(),
                record.net_pay.to_string()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(PayrollError::DuplicateRecord {
                employee_id: record.employee_id,
                pay_period_id: record.pay_period_id,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn mark_period_processed(
        &mut self,
        id: i64,
        processed_at: DateTime<Utc>,
    ) -> PayrollResult<usize> {
        let rows = self.tx.execute(
            "UPDATE pay_periods SET processed_at = ?1 WHERE id = ?2 AND processed_at IS NULL",
            params![processed_at, id],
        )?;
        Ok(rows)
    }

    fn commit(self) -> PayrollResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

impl PayrollStore for SqlitePayrollStore {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> PayrollResult<SqliteTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTransaction { tx })
    }

    fn add_employee(&mut self, employee: NewEmployee) -> PayrollResult<Employee> {
        employee.validate()?;
        self.conn.execute(
            "INSERT INTO employees \
             (first_name, last_name, department, employment_type, hourly_rate, hire_date, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                employee.first_name,
                employee.last_name,
                employee.department,
                employee.employment_type.as_str(),
                employee.hourly_rate.to_string(),
                employee.hire_date,
                employee.is_active
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(employee_id = id, "Employee added");
        Ok(employee.into_employee(id))
    }

    fn set_employee_active(&mut self, id: i64, is_active: bool) -> PayrollResult<()> {
        let rows = self.conn.execute(
            "UPDATE employees SET is_active = ?1 WHERE id = ?2",
            params![is_active, id],
        )?;
        if rows == 0 {
            return Err(PayrollError::EmployeeNotFound { id });
        }
        Ok(())
    }

    fn add_time_entry(&mut self, entry: TimeEntry) -> PayrollResult<()> {
        entry.validate()?;
        let result = self.conn.execute(
            "INSERT INTO time_entries (employee_id, date_worked, hours_worked) VALUES (?1, ?2, ?3)",
            params![
                entry.employee_id,
                entry.date_worked,
                entry.hours_worked.to_string()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(PayrollError::DuplicateTimeEntry {
                employee_id: entry.employee_id,
                date: entry.date_worked,
            }),
            Err(err) if is_foreign_key_violation(&err) => Err(PayrollError::EmployeeNotFound {
                id: entry.employee_id,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn add_pay_period(&mut self, start: NaiveDate, end: NaiveDate) -> PayrollResult<PayPeriod> {
        validate_range(start, end)?;
        self.conn.execute(
            "INSERT INTO pay_periods (start_date, end_date) VALUES (?1, ?2)",
            params![start, end],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(pay_period_id = id, %start, %end, "Pay period added");
        PayPeriod::new(id, start, end)
    }

    fn remove_pay_period(&mut self, id: i64) -> PayrollResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM pay_periods WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(PayrollError::PayPeriodNotFound { id });
        }
        Ok(())
    }

    fn get_pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
        fetch_pay_period(&self.conn, id)
    }

    fn payroll_for_period(&self, pay_period_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT employee_id, pay_period_id, gross_pay, net_pay FROM payroll \
             WHERE pay_period_id = ?1 ORDER BY employee_id ASC",
        )?;
        let records = stmt
            .query_map(params![pay_period_id], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn payroll_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT pr.employee_id, pr.pay_period_id, pr.gross_pay, pr.net_pay FROM payroll pr \
             JOIN pay_periods p ON pr.pay_period_id = p.id \
             WHERE pr.employee_id = ?1 ORDER BY p.start_date ASC",
        )?;
        let records = stmt
            .query_map(params![employee_id], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn time_entries_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<TimeEntry>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT employee_id, date_worked, hours_worked FROM time_entries \
             WHERE employee_id = ?1 ORDER BY date_worked ASC",
        )?;
        let entries = stmt
            .query_map(params![employee_id], |row| {
                Ok(TimeEntry {
                    employee_id: row.get(0)?,
                    date_worked: row.get(1)?,
                    hours_worked: decimal_column(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn fetch_pay_period(conn: &Connection, id: i64) -> PayrollResult<Option<PayPeriod>> {
    let period = conn
        .query_row(
            "SELECT id, start_date, end_date, processed_at FROM pay_periods WHERE id = ?1",
            params![id],
            |row| {
                Ok(PayPeriod {
                    id: row.get(0)?,
                    start_date: row.get(1)?,
                    end_date: row.get(2)?,
                    processed_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(period)
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let employment_type: String = row.get(4)?;
    let employment_type = EmploymentType::from_str(&employment_type)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Employee {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        department: row.get(3)?,
        employment_type,
        hourly_rate: decimal_column(row, 5)?,
        hire_date: row.get(6)?,
        is_active: row.get(7)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PayrollRecord> {
    Ok(PayrollRecord {
        employee_id: row.get(0)?,
        pay_period_id: row.get(1)?,
        gross_pay: decimal_column(row, 2)?,
        net_pay: decimal_column(row, 3)?,
    })
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
