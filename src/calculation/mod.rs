//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure functions a payroll run is built from: summing
//! hours inside a pay period window, converting hours to gross pay, deducting the
//! flat tax, and rounding the results to currency precision.

mod hours;
mod pay;
mod rounding;

pub use hours::sum_hours_in_window;
pub use pay::{PayCalculationResult, apply_flat_tax, calculate_gross_pay, calculate_pay};
pub use rounding::{RoundingMode, round_currency};
