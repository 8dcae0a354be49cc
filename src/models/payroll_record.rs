//! Payroll records and run summaries.
//!
//! A [`PayrollRecord`] is what a payroll run persists per employee. A
//! [`PayrollRunSummary`] is what it hands back to the caller, including the
//! [`PayLine`] and [`AuditStep`] for each employee paid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;

/// The persisted pay result for one employee in one pay period.
///
/// A store enforces at most one record per (employee, pay period). Records are
/// written once, inside the run that closes the period, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee who was paid.
    pub employee_id: i64,
    /// The period the pay covers.
    pub pay_period_id: i64,
    /// Hours times hourly rate, rounded to currency precision.
    pub gross_pay: Decimal,
    /// Gross pay after the flat tax deduction, rounded to currency precision.
    pub net_pay: Decimal,
}

/// One employee's line in a payroll run.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayLine;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let line = PayLine {
///     employee_id: 1,
///     total_hours: Decimal::from_str("16").unwrap(),
///     hourly_rate: Decimal::from_str("20.00").unwrap(),
///     gross_pay: Decimal::from_str("320.00").unwrap(),
///     tax_withheld: Decimal::from_str("48.00").unwrap(),
///     net_pay: Decimal::from_str("272.00").unwrap(),
/// };
/// assert_eq!(line.gross_pay - line.tax_withheld, line.net_pay);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The employee who was paid.
    pub employee_id: i64,
    /// Hours worked inside the period window.
    pub total_hours: Decimal,
    /// The hourly rate applied.
    pub hourly_rate: Decimal,
    /// Rounded gross pay.
    pub gross_pay: Decimal,
    /// Rounded gross minus rounded net.
    pub tax_withheld: Decimal,
    /// Rounded net pay.
    pub net_pay: Decimal,
}

impl PayLine {
    /// The record persisted for this line.
    pub fn to_record(&self, pay_period_id: i64) -> PayrollRecord {
        PayrollRecord {
            employee_id: self.employee_id,
            pay_period_id,
            gross_pay: self.gross_pay,
            net_pay: self.net_pay,
        }
    }
}

/// A single step in the audit trail recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The outcome of a successful payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRunSummary {
    /// Correlation id for the run, also present in its log lines.
    pub run_id: Uuid,
    /// The period as closed by this run, with `processed_at` set.
    pub pay_period: PayPeriod,
    /// When the period was stamped as processed.
    pub processed_at: DateTime<Utc>,
    /// How many employees received a payroll record. Zero is a valid outcome.
    pub paid_count: usize,
    /// One line per employee paid, in store order.
    pub pay_lines: Vec<PayLine>,
    /// How each line was derived.
    pub audit_steps: Vec<AuditStep>,
    /// Sum of gross pay across all lines.
    pub total_gross: Decimal,
    /// Sum of net pay across all lines.
    pub total_net: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_pay_line_to_record() {
        let line = PayLine {
            employee_id: 7,
            total_hours: dec("10"),
            hourly_rate: dec("25.00"),
            gross_pay: dec("250.00"),
            tax_withheld: dec("37.50"),
            net_pay: dec("212.50"),
        };

        let record = line.to_record(3);
        assert_eq!(record.employee_id, 7);
        assert_eq!(record.pay_period_id, 3);
        assert_eq!(record.gross_pay, dec("250.00"));
        assert_eq!(record.net_pay, dec("212.50"));
    }

    #[test]
    fn test_payroll_record_serializes_decimals_as_strings() {
        let record = PayrollRecord {
            employee_id: 1,
            pay_period_id: 2,
            gross_pay: dec("320.00"),
            net_pay: dec("272.00"),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"gross_pay\":\"320.00\""));
        assert!(json.contains("\"net_pay\":\"272.00\""));
    }
}
