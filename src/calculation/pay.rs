//! Gross and net pay calculation.
//!
//! This module turns an employee's aggregated hours into the figures a payroll
//! record stores: `gross = hours × rate` and `net = gross × (1 − tax_rate)`.

use rust_decimal::Decimal;

use super::rounding::round_currency;
use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{AuditStep, Employee, PayLine};

/// The result of a pay calculation, including the pay line and audit step.
#[derive(Debug, Clone)]
pub struct PayCalculationResult {
    /// The rounded figures for the employee.
    pub pay_line: PayLine,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes gross pay before any rounding.
///
/// Returns `None` if the product does not fit in a `Decimal`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_gross_pay;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let gross = calculate_gross_pay(Decimal::from_str("16").unwrap(), Decimal::from_str("20.0").unwrap());
/// assert_eq!(gross, Some(Decimal::from_str("320").unwrap()));
///
/// assert_eq!(calculate_gross_pay(Decimal::MAX, Decimal::TWO), None);
/// ```
pub fn calculate_gross_pay(total_hours: Decimal, hourly_rate: Decimal) -> Option<Decimal> {
    total_hours.checked_mul(hourly_rate)
}

/// Applies the flat tax deduction to an unrounded gross figure.
///
/// Returns `None` if the result does not fit in a `Decimal`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_flat_tax;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let net = apply_flat_tax(Decimal::from_str("320").unwrap(), Decimal::from_str("0.15").unwrap());
/// assert_eq!(net, Some(Decimal::from_str("272").unwrap()));
/// ```
pub fn apply_flat_tax(gross_pay: Decimal, tax_rate: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_sub(tax_rate)
        .and_then(|keep| gross_pay.checked_mul(keep))
}

/// Calculates one employee's pay for a period.
///
/// Gross and net are both derived from the unrounded values and then rounded once
/// to `config.currency_scale` using `config.rounding`. The tax withheld is the
/// difference of the rounded figures, so a pay line always balances.
///
/// # Errors
///
/// Returns `InvalidEmployee` if the hourly rate or the aggregated hours are negative.
/// Neither can reach a run through a store that validates its inputs. Returns
/// `PayOverflow` if gross or net pay does not fit in a `Decimal`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_pay;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::{Employee, EmploymentType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let employee = Employee {
///     id: 1,
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     department: "Engineering".to_string(),
///     employment_type: EmploymentType::FullTime,
///     hourly_rate: Decimal::from_str("20.0").unwrap(),
///     hire_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
///     is_active: true,
/// };
///
/// let result = calculate_pay(&employee, Decimal::from_str("16").unwrap(), &PayrollConfig::default(), 1).unwrap();
/// assert_eq!(result.pay_line.gross_pay.to_string(), "320.00");
/// assert_eq!(result.pay_line.net_pay.to_string(), "272.00");
/// ```
pub fn calculate_pay(
    employee: &Employee,
    total_hours: Decimal,
    config: &PayrollConfig,
    step_number: u32,
) -> PayrollResult<PayCalculationResult> {
    if employee.hourly_rate < Decimal::ZERO {
        return Err(PayrollError::InvalidEmployee {
            field: "hourly_rate".to_string(),
            message: format!(
                "employee {} has negative hourly rate {}",
                employee.id, employee.hourly_rate
            ),
        });
    }
    if total_hours < Decimal::ZERO {
        return Err(PayrollError::InvalidEmployee {
            field: "hours_worked".to_string(),
            message: format!(
                "employee {} has negative total hours {}",
                employee.id, total_hours
            ),
        });
    }

    let exact_gross = calculate_gross_pay(total_hours, employee.hourly_rate).ok_or_else(|| {
        PayrollError::PayOverflow {
            employee_id: employee.id,
            message: format!(
                "gross pay for {}h at {} overflowed",
                total_hours, employee.hourly_rate
            ),
        }
    })?;
    let exact_net =
        apply_flat_tax(exact_gross, config.tax_rate).ok_or_else(|| PayrollError::PayOverflow {
            employee_id: employee.id,
            message: format!("net pay of {} at tax {} overflowed", exact_gross, config.tax_rate),
        })?;

    let gross_pay = round_currency(exact_gross, config.currency_scale, config.rounding);
    let net_pay = round_currency(exact_net, config.currency_scale, config.rounding);
    let tax_withheld = gross_pay - net_pay;

    let audit_step = AuditStep {
        step_number,
        rule_id: "flat_tax_pay".to_string(),
        rule_name: "Hourly Pay With Flat Tax".to_string(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "total_hours": total_hours.normalize().to_string(),
            "hourly_rate": employee.hourly_rate.to_string(),
            "tax_rate": config.tax_rate.to_string()
        }),
        output: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax_withheld": tax_withheld.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "{}h x ${} = ${}; ${} x (1 - {}) = ${}",
            total_hours.normalize(),
            employee.hourly_rate,
            gross_pay,
            gross_pay,
            config.tax_rate,
            net_pay
        ),
    };

    Ok(PayCalculationResult {
        pay_line: PayLine {
            employee_id: employee.id,
            total_hours,
            hourly_rate: employee.hourly_rate,
            gross_pay,
            tax_withheld,
            net_pay,
        },
        audit_step,
    })
}
