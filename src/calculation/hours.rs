//! Hours aggregation over a pay period window.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::TimeEntry;

/// Sums the hours of one employee's entries dated within `[start, end]`.
///
/// Both ends are inclusive. Entries for other employees and entries outside the
/// window are ignored; no matching entries yields zero. Returns `None` if the total
/// does not fit in a `Decimal`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::sum_hours_in_window;
/// use payroll_engine::models::TimeEntry;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let entries = vec![
///     TimeEntry::new(1, day(1), Decimal::new(8, 0)),
///     TimeEntry::new(1, day(2), Decimal::new(8, 0)),
///     TimeEntry::new(1, day(20), Decimal::new(8, 0)),
/// ];
///
/// let hours = sum_hours_in_window(&entries, 1, day(1), day(14));
/// assert_eq!(hours, Some(Decimal::new(16, 0)));
/// ```
pub fn sum_hours_in_window<'a, I>(
    entries: I,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.employee_id == employee_id)
        .filter(|e| e.date_worked >= start && e.date_worked <= end)
        .try_fold(Decimal::ZERO, |total, e| total.checked_add(e.hours_worked))
}
