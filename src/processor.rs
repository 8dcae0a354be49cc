//! Payroll run orchestration.
//!
//! [`PayrollProcessor::run_for_period`] is the single entry point for paying a pay
//! period. It reads the period and the active employees, computes each employee's
//! pay, writes one payroll record per employee and stamps the period as processed,
//! all inside one storage transaction.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::calculate_pay;
use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{PayLine, PayrollRunSummary};
use crate::store::{PayrollStore, PayrollTransaction};

/// Runs payroll for pay periods held in a [`PayrollStore`].
///
/// The processor keeps no state between runs beyond its store and configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{EmploymentType, NewEmployee, TimeEntry};
/// use payroll_engine::processor::PayrollProcessor;
/// use payroll_engine::store::{InMemoryPayrollStore, PayrollStore};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let mut store = InMemoryPayrollStore::new();
/// let employee = store.add_employee(NewEmployee {
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     department: "Engineering".to_string(),
///     employment_type: EmploymentType::FullTime,
///     hourly_rate: Decimal::new(200, 1),
///     hire_date: day(1),
///     is_active: true,
/// })?;
/// store.add_time_entry(TimeEntry::new(employee.id, day(1), Decimal::new(8, 0)))?;
/// store.add_time_entry(TimeEntry::new(employee.id, day(2), Decimal::new(8, 0)))?;
/// let period = store.add_pay_period(day(1), day(14))?;
///
/// let mut processor = PayrollProcessor::new(store, PayrollConfig::default())?;
/// let summary = processor.run_for_period(period.id)?;
///
/// assert_eq!(summary.paid_count, 1);
/// assert_eq!(summary.pay_lines[0].gross_pay.to_string(), "320.00");
/// assert_eq!(summary.pay_lines[0].net_pay.to_string(), "272.00");
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug)]
pub struct PayrollProcessor<S> {
    store: S,
    config: PayrollConfig,
}

impl<S: PayrollStore> PayrollProcessor<S> {
    /// Creates a processor over `store` using `config` for tax and rounding.
    ///
    /// Fails with `ConfigInvalid` if the configuration does not validate.
    pub fn new(store: S, config: PayrollConfig) -> PayrollResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Returns the configuration runs are computed with.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the underlying store for record maintenance.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the processor, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Pays every active employee for a pay period and closes the period.
    ///
    /// Steps, each of which aborts the run on failure:
    /// 1. Load the period (`PayPeriodNotFound` if absent).
    /// 2. Refuse a closed period (`AlreadyProcessed`).
    /// 3. Load active employees. None is not an error; the period is still closed.
    /// 4. Per employee: sum hours in `[start_date, end_date]`, compute gross and net,
    ///    insert the payroll record (`DuplicateRecord` if one exists).
    /// 5. Stamp the period (`CommitFailure` unless exactly one row changed).
    ///
    /// Everything happens in one transaction. On any error nothing is written: no
    /// records for earlier employees survive and the period stays open.
    pub fn run_for_period(&mut self, pay_period_id: i64) -> PayrollResult<PayrollRunSummary> {
        let run_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(run_id = %run_id, pay_period_id, "Starting payroll run");

        let result = self.execute_run(run_id, pay_period_id);

        match &result {
            Ok(summary) => info!(
                run_id = %run_id,
                pay_period_id,
                paid_count = summary.paid_count,
                total_gross = %summary.total_gross,
                total_net = %summary.total_net,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll run completed"
            ),
            Err(err) => warn!(
                run_id = %run_id,
                pay_period_id,
                error = %err,
                "Payroll run failed, no changes committed"
            ),
        }

        result
    }

    fn execute_run(&mut self, run_id: Uuid, pay_period_id: i64) -> PayrollResult<PayrollRunSummary> {
        let mut tx = self.store.begin()?;

        let mut pay_period = tx
            .pay_period(pay_period_id)?
            .ok_or(PayrollError::PayPeriodNotFound { id: pay_period_id })?;

        if let Some(processed_at) = pay_period.processed_at {
            return Err(PayrollError::AlreadyProcessed {
                id: pay_period_id,
                processed_at,
            });
        }

        let employees = tx.active_employees()?;
        if employees.is_empty() {
            info!(run_id = %run_id, pay_period_id, "No active employees found for this pay period");
        }

        let mut pay_lines = Vec::with_capacity(employees.len());
        let mut audit_steps = Vec::with_capacity(employees.len());
        let mut step_number: u32 = 1;

        for employee in &employees {
            let total_hours =
                tx.sum_hours_worked(employee.id, pay_period.start_date, pay_period.end_date)?;
            let calculation = calculate_pay(employee, total_hours, &self.config, step_number)?;
            step_number += 1;

            tx.insert_payroll_record(&calculation.pay_line.to_record(pay_period_id))?;
            debug!(
                run_id = %run_id,
                employee_id = employee.id,
                total_hours = %total_hours,
                gross_pay = %calculation.pay_line.gross_pay,
                net_pay = %calculation.pay_line.net_pay,
                "Payroll record staged"
            );

            pay_lines.push(calculation.pay_line);
            audit_steps.push(calculation.audit_step);
        }

        let (total_gross, total_net) = run_totals(&pay_lines)?;

        let processed_at = Utc::now();
        let rows_affected = tx.mark_period_processed(pay_period_id, processed_at)?;
        if rows_affected != 1 {
            return Err(PayrollError::CommitFailure {
                pay_period_id,
                rows_affected,
            });
        }

        tx.commit()?;
        pay_period.processed_at = Some(processed_at);

        Ok(PayrollRunSummary {
            run_id,
            pay_period,
            processed_at,
            paid_count: pay_lines.len(),
            pay_lines,
            audit_steps,
            total_gross,
            total_net,
        })
    }
}

/// Sums gross and net across the run's pay lines.
fn run_totals(pay_lines: &[PayLine]) -> PayrollResult<(Decimal, Decimal)> {
    let mut total_gross = Decimal::ZERO;
    let mut total_net = Decimal::ZERO;
    for line in pay_lines {
        let overflow = |what: &str| PayrollError::PayOverflow {
            employee_id: line.employee_id,
            message: format!("run total {} overflowed", what),
        };
        total_gross = total_gross
            .checked_add(line.gross_pay)
            .ok_or_else(|| overflow("gross"))?;
        total_net = total_net
            .checked_add(line.net_pay)
            .ok_or_else(|| overflow("net"))?;
    }
    Ok((total_gross, total_net))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::sum_hours_in_window;
    use crate::models::{Employee, EmploymentType, NewEmployee, PayPeriod, PayrollRecord, TimeEntry};
    use crate::store::InMemoryPayrollStore;
    use chrono::{DateTime, NaiveDate};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn new_employee(first_name: &str, hourly_rate: &str) -> NewEmployee {
        NewEmployee {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            department: "Payroll".to_string(),
            employment_type: EmploymentType::FullTime,
            hourly_rate: dec(hourly_rate),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            is_active: true,
        }
    }

    fn processor_with(store: InMemoryPayrollStore) -> PayrollProcessor<InMemoryPayrollStore> {
        PayrollProcessor::new(store, PayrollConfig::default()).unwrap()
    }

    #[test]
    fn test_pays_hours_inside_window() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20.0")).unwrap();
        store.add_time_entry(TimeEntry::new(ann.id, day(1), dec("8"))).unwrap();
        store.add_time_entry(TimeEntry::new(ann.id, day(2), dec("8"))).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let summary = processor.run_for_period(period.id).unwrap();

        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pay_lines[0].total_hours, dec("16"));
        assert_eq!(summary.total_gross, dec("320.00"));
        assert_eq!(summary.total_net, dec("272.00"));

        let records = processor.store().payroll_for_period(period.id).unwrap();
        assert_eq!(
            records,
            vec![PayrollRecord {
                employee_id: ann.id,
                pay_period_id: period.id,
                gross_pay: dec("320.00"),
                net_pay: dec("272.00"),
            }]
        );
    }

    #[test]
    fn test_unknown_period_is_not_found() {
        let mut processor = processor_with(InMemoryPayrollStore::new());
        let result = processor.run_for_period(12);
        assert!(matches!(result, Err(PayrollError::PayPeriodNotFound { id: 12 })));
    }

    #[test]
    fn test_no_active_employees_closes_period() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20")).unwrap();
        store.set_employee_active(ann.id, false).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let summary = processor.run_for_period(period.id).unwrap();

        assert_eq!(summary.paid_count, 0);
        assert!(summary.pay_lines.is_empty());
        assert_eq!(summary.total_gross, Decimal::ZERO);
        let stored = processor.store().get_pay_period(period.id).unwrap().unwrap();
        assert_eq!(stored.processed_at, Some(summary.processed_at));
        assert!(processor.store().payroll_for_period(period.id).unwrap().is_empty());
    }

    #[test]
    fn test_employee_without_entries_gets_zero_record() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "45.50")).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        processor.run_for_period(period.id).unwrap();

        let records = processor.store().payroll_for_period(period.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].employee_id, ann.id);
        assert_eq!(records[0].gross_pay.to_string(), "0.00");
        assert_eq!(records[0].net_pay.to_string(), "0.00");
    }

    #[test]
    fn test_second_run_is_already_processed() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20")).unwrap();
        store.add_time_entry(TimeEntry::new(ann.id, day(3), dec("8"))).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let first = processor.run_for_period(period.id).unwrap();

        // New hours and a new hire after closing must not reach the closed period.
        processor
            .store_mut()
            .add_time_entry(TimeEntry::new(ann.id, day(4), dec("8")))
            .unwrap();
        processor.store_mut().add_employee(new_employee("Bob", "30")).unwrap();

        let second = processor.run_for_period(period.id);
        match second {
            Err(PayrollError::AlreadyProcessed { id, processed_at }) => {
                assert_eq!(id, period.id);
                assert_eq!(processed_at, first.processed_at);
            }
            other => panic!("Expected AlreadyProcessed, got {:?}", other),
        }

        let records = processor.store().payroll_for_period(period.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gross_pay, dec("160.00"));
    }

    #[test]
    fn test_inactive_employees_are_skipped() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20")).unwrap();
        let bob = store.add_employee(new_employee("Bob", "20")).unwrap();
        store.set_employee_active(bob.id, false).unwrap();
        store.add_time_entry(TimeEntry::new(bob.id, day(2), dec("8"))).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let summary = processor.run_for_period(period.id).unwrap();

        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pay_lines[0].employee_id, ann.id);
    }

    #[test]
    fn test_boundary_dates_count_and_outside_dates_do_not() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "10")).unwrap();
        for (d, hours) in [(1, "1"), (5, "2"), (14, "4"), (15, "8")] {
            store.add_time_entry(TimeEntry::new(ann.id, day(d), dec(hours))).unwrap();
        }
        store
            .add_time_entry(TimeEntry::new(
                ann.id,
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                dec("16"),
            ))
            .unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let summary = processor.run_for_period(period.id).unwrap();

        assert_eq!(summary.pay_lines[0].total_hours, dec("7"));
        assert_eq!(summary.pay_lines[0].gross_pay, dec("70.00"));
    }

    #[test]
    fn test_configured_tax_rate_is_used() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20")).unwrap();
        store.add_time_entry(TimeEntry::new(ann.id, day(2), dec("10"))).unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let config = PayrollConfig::default().with_tax_rate(dec("0.25"));
        let mut processor = PayrollProcessor::new(store, config).unwrap();
        let summary = processor.run_for_period(period.id).unwrap();

        assert_eq!(summary.pay_lines[0].gross_pay, dec("200.00"));
        assert_eq!(summary.pay_lines[0].net_pay, dec("150.00"));
        assert_eq!(summary.pay_lines[0].tax_withheld, dec("50.00"));
    }

    #[test]
    fn test_summary_lists_employees_in_id_order_with_audit_steps() {
        let mut store = InMemoryPayrollStore::new();
        let ids: Vec<i64> = ["Ann", "Bob", "Cat"]
            .iter()
            .map(|name| store.add_employee(new_employee(name, "15")).unwrap().id)
            .collect();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let summary = processor.run_for_period(period.id).unwrap();

        let paid: Vec<i64> = summary.pay_lines.iter().map(|l| l.employee_id).collect();
        assert_eq!(paid, ids);
        let steps: Vec<u32> = summary.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(steps, vec![1, 2, 3]);
        assert_eq!(summary.pay_period.processed_at, Some(summary.processed_at));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PayrollConfig::default().with_tax_rate(dec("2"));
        let result = PayrollProcessor::new(InMemoryPayrollStore::new(), config);
        assert!(matches!(
            result,
            Err(PayrollError::ConfigInvalid { ref field, .. }) if field == "tax_rate"
        ));
    }

    #[test]
    fn test_unrepresentable_pay_fails_run_and_keeps_period_open() {
        let mut store = InMemoryPayrollStore::new();
        let ann = store.add_employee(new_employee("Ann", "20")).unwrap();
        let big = store
            .add_employee(new_employee("Big", "1000000000000000"))
            .unwrap();
        store
            .add_time_entry(TimeEntry::new(big.id, day(2), dec("100000000000000")))
            .unwrap();
        let period = store.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = processor_with(store);
        let result = processor.run_for_period(period.id);

        assert!(matches!(
            result,
            Err(PayrollError::PayOverflow { employee_id, .. }) if employee_id == big.id
        ));
        let store = processor.store();
        assert!(store.payroll_for_employee(ann.id).unwrap().is_empty());
        assert!(!store.get_pay_period(period.id).unwrap().unwrap().is_processed());
    }

    #[test]
    fn test_run_totals_overflow_is_error() {
        let line = |employee_id| PayLine {
            employee_id,
            total_hours: Decimal::ONE,
            hourly_rate: Decimal::MAX,
            gross_pay: Decimal::MAX,
            tax_withheld: Decimal::ZERO,
            net_pay: Decimal::MAX,
        };
        let result = run_totals(&[line(1), line(2)]);
        assert!(matches!(
            result,
            Err(PayrollError::PayOverflow { employee_id: 2, .. })
        ));
    }

    /// A store whose final stamp never lands, as if the period vanished mid-run.
    struct VanishingPeriodStore {
        inner: InMemoryPayrollStore,
    }

    struct VanishingPeriodTransaction<'a> {
        inner: crate::store::InMemoryTransaction<'a>,
    }

    impl PayrollTransaction for VanishingPeriodTransaction<'_> {
        fn pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
            self.inner.pay_period(id)
        }

        fn active_employees(&self) -> PayrollResult<Vec<Employee>> {
            self.inner.active_employees()
        }

        fn sum_hours_worked(
            &self,
            employee_id: i64,
            start: NaiveDate,
            end: NaiveDate,
        ) -> PayrollResult<Decimal> {
            self.inner.sum_hours_worked(employee_id, start, end)
        }

        fn insert_payroll_record(&mut self, record: &PayrollRecord) -> PayrollResult<()> {
            self.inner.insert_payroll_record(record)
        }

        fn mark_period_processed(
            &mut self,
            _id: i64,
            _processed_at: DateTime<Utc>,
        ) -> PayrollResult<usize> {
            Ok(0)
        }

        fn commit(self) -> PayrollResult<()> {
            self.inner.commit()
        }
    }

    impl PayrollStore for VanishingPeriodStore {
        type Transaction<'a> = VanishingPeriodTransaction<'a>;

        fn begin(&mut self) -> PayrollResult<VanishingPeriodTransaction<'_>> {
            Ok(VanishingPeriodTransaction {
                inner: self.inner.begin()?,
            })
        }

        fn add_employee(&mut self, employee: NewEmployee) -> PayrollResult<Employee> {
            self.inner.add_employee(employee)
        }

        fn set_employee_active(&mut self, id: i64, is_active: bool) -> PayrollResult<()> {
            self.inner.set_employee_active(id, is_active)
        }

        fn add_time_entry(&mut self, entry: TimeEntry) -> PayrollResult<()> {
            self.inner.add_time_entry(entry)
        }

        fn add_pay_period(&mut self, start: NaiveDate, end: NaiveDate) -> PayrollResult<PayPeriod> {
            self.inner.add_pay_period(start, end)
        }

        fn remove_pay_period(&mut self, id: i64) -> PayrollResult<()> {
            self.inner.remove_pay_period(id)
        }

        fn get_pay_period(&self, id: i64) -> PayrollResult<Option<PayPeriod>> {
            self.inner.get_pay_period(id)
        }

        fn payroll_for_period(&self, pay_period_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
            self.inner.payroll_for_period(pay_period_id)
        }

        fn payroll_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<PayrollRecord>> {
            self.inner.payroll_for_employee(employee_id)
        }

        fn time_entries_for_employee(&self, employee_id: i64) -> PayrollResult<Vec<TimeEntry>> {
            self.inner.time_entries_for_employee(employee_id)
        }
    }

    #[test]
    fn test_stamp_without_effect_is_commit_failure() {
        let mut inner = InMemoryPayrollStore::new();
        inner.add_employee(new_employee("Ann", "20")).unwrap();
        let period = inner.add_pay_period(day(1), day(14)).unwrap();

        let mut processor = PayrollProcessor::new(
            VanishingPeriodStore { inner },
            PayrollConfig::default(),
        )
        .unwrap();
        let result = processor.run_for_period(period.id);

        assert!(matches!(
            result,
            Err(PayrollError::CommitFailure { rows_affected: 0, .. })
        ));
        assert!(processor.store().payroll_for_period(period.id).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_stored_pay_replays_from_entries(
            rate_cents in 0u32..20_000,
            quarter_hours in proptest::collection::vec(0u32..64, 0..20),
        ) {
            let mut store = InMemoryPayrollStore::new();
            let hourly_rate = Decimal::new(i64::from(rate_cents), 2);
            let ann = store
                .add_employee(NewEmployee {
                    hourly_rate,
                    ..new_employee("Ann", "0")
                })
                .unwrap();
            for (i, quarters) in quarter_hours.iter().enumerate() {
                let date = day(1) + chrono::Duration::days(i as i64);
                let hours = Decimal::new(i64::from(*quarters) * 25, 2);
                store.add_time_entry(TimeEntry::new(ann.id, date, hours)).unwrap();
            }
            let period = store.add_pay_period(day(1), day(14)).unwrap();

            let mut processor = processor_with(store);
            processor.run_for_period(period.id).unwrap();

            let store = processor.store();
            let records = store.payroll_for_period(period.id).unwrap();
            prop_assert_eq!(records.len(), 1);

            let entries = store.time_entries_for_employee(ann.id).unwrap();
            let hours =
                sum_hours_in_window(&entries, ann.id, period.start_date, period.end_date).unwrap();
            let replay = calculate_pay(&ann, hours, processor.config(), 1).unwrap();

            prop_assert_eq!(records[0].gross_pay, replay.pay_line.gross_pay);
            prop_assert_eq!(records[0].net_pay, replay.pay_line.net_pay);
            prop_assert!(records[0].net_pay <= records[0].gross_pay);
        }
    }
}
