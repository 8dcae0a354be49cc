//! In-memory payroll store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::{PayrollStore, PayrollTransaction};
use crate::calculation::sum_hours_in_window;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{Employee, NewEmployee, PayPeriod, PayrollRecord, TimeEntry, validate_range};

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: BTreeMap<i64, Employee>,
    time_entries: BTreeMap<(i64, NaiveDate), TimeEntry>,
    pay_periods: BTreeMap<i64, PayPeriod>,
    /// Keyed by (pay_period_id, employee_id).
    payroll: BTreeMap<(i64, i64), PayrollRecord>,
    next_employee_id: i64,
    next_pay_period_id: i64,
}

/// A payroll store held entirely in memory.
///
/// Enforces the same constraints as the SQLite store. A transaction works on a copy
/// of the tables and swaps it in on commit, so an abandoned run leaves nothing behind.
/// Ideal for testing or benchmarking where persistence is not required.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayrollStore {
    tables: Tables,
}

impl InMemoryPayrollStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A payroll run's view of an [`InMemoryPayrollStore`].
pub struct InMemoryTransaction<'a> {
    committed: &'a mut Tables,
    working: Tables,
}

impl PayrollTransaction for InMemoryTransaction<'_> {
    fn pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
        Ok(self.working.pay_periods.get(&id).cloned())
    }

    fn active_employees(&self) -> PayrollResult<Vec<Employee>> {
        Ok(self
            .working
            .employees
            .values()
            .filter(|e| e.is_active)
            .cloned()
            .collect())
    }

    fn sum_hours_worked(
        &self,
        employee_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PayrollResult<Decimal> {
        let entries = self
            .working
            .time_entries
            .range((employee_id, start)..=(employee_id, end))
            .map(|(_, entry)| entry);
        sum_hours_in_window(entries, employee_id, start, end).ok_or_else(|| {
            PayrollError::PayOverflow {
                employee_id,
                message: format!("hours worked between {} and {} overflowed", start, end),
            }
        })
    }

    fn insert_payroll_record(&mut self, record: &PayrollRecord) -> PayrollResult<()> {
        let key = (record.pay_period_id, record.employee_id);
        if self.working.payroll.contains_key(&key) {
            return Err(PayrollError::DuplicateRecord {
                employee_id: record.employee_id,
                pay_period_id: record.pay_period_id,
            });
        }
        self.working.payroll.insert(key, record.clone());
        Ok(())
    }

    fn mark_period_processed(
        &mut self,
        id: i64,
        processed_at: DateTime<Utc>,
    ) -> PayrollResult<usize> {
        match self.working.pay_periods.get_mut(&id) {
            Some(period) if period.processed_at.is_none() => {
                period.processed_at = Some(processed_at);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn commit(self) -> PayrollResult<()> {
        *self.committed = self.working;
        Ok(())
    }
}

impl PayrollStore for InMemoryPayrollStore {
    type Transaction<'a> = InMemoryTransaction<'a>;

    fn begin(&mut self) -> PayrollResult<InMemoryTransaction<'_>> {
        let working = self.tables.clone();
        Ok(InMemoryTransaction {
            committed: &mut self.tables,
            working,
        })
    }

    fn add_employee(&mut self, employee: NewEmployee) -> PayrollResult<Employee> {
        employee.validate()?;
        self.tables.next_employee_id += 1;
        let employee = employee.into_employee(self.tables.next_employee_id);
        self.tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn set_employee_active(&mut self, id: i64, is_active: bool) -> PayrollResult<()> {
        let employee = self
            .tables
            .employees
            .get_mut(&id)
            .ok_or(PayrollError::EmployeeNotFound { id })?;
        employee.is_active = is_active;
        Ok(())
    }

    fn add_time_entry(&mut self, entry: TimeEntry) -> PayrollResult<()> {
        entry.validate()?;
        if !self.tables.employees.contains_key(&entry.employee_id) {
            return Err(PayrollError::EmployeeNotFound {
                id: entry.employee_id,
            });
        }
        let key = (entry.employee_id, entry.date_worked);
        if self.tables.time_entries.contains_key(&key) {
            return Err(PayrollError::DuplicateTimeEntry {
                employee_id: entry.employee_id,
                date: entry.date_worked,
            });
        }
        self.tables.time_entries.insert(key, entry);
        Ok(())
    }

    fn add_pay_period(&mut self, start: NaiveDate, end: NaiveDate) -> PayrollResult<PayPeriod> {
        validate_range(start, end)?;
        self.tables.next_pay_period_id += 1;
        let period = PayPeriod::new(self.tables.next_pay_period_id, start, end)?;
        self.tables.pay_periods.insert(period.id, period.clone());
        Ok(period)
    }

    fn remove_pay_period(&mut self, id: i64) -> PayrollResult<()> {
        if self.tables.pay_periods.remove(&id).is_none() {
            return Err(PayrollError::PayPeriodNotFound { id });
        }
        self.tables.payroll.retain(|(period_id, _), _| *period_id != id);
        Ok(())
    }

    fn get_pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
        Ok(self.tables.pay_periods.get(&id).cloned())
    }

    fn payroll_for_period(&self, pay_period_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
        Ok(self
            .tables
            .payroll
            .range((pay_period_id, i64::MIN)..=(pay_period_id, i64::MAX))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn payroll_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
        let mut records: Vec<(NaiveDate, PayrollRecord)> = self
            .tables
            .payroll
            .values()
            .filter(|r| r.employee_id == employee_id)
            .filter_map(|r| {
                self.tables
                    .pay_periods
                    .get(&r.pay_period_id)
                    .map(|p| (p.start_date, r.clone()))
            })
            .collect();
        records.sort_by_key(|(start, _)| *start);
        Ok(records.into_iter().map(|(_, r)| r).collect())
    }

    fn time_entries_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<TimeEntry>> {
        Ok(self
            .tables
            .time_entries
            .range((employee_id, NaiveDate::MIN)..=(employee_id, NaiveDate::MAX))
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}
