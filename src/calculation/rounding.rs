//! Currency rounding.
//!
//! Pay is accumulated at full `Decimal` precision and rounded exactly once, when a
//! payroll record is written.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How pay figures are brought to currency precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Midpoints round away from zero (2.345 -> 2.35).
    #[default]
    HalfUp,
    /// Midpoints round to the even neighbour (2.345 -> 2.34).
    HalfEven,
    /// Extra digits are dropped (2.349 -> 2.34).
    Truncate,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Truncate => RoundingStrategy::ToZero,
        }
    }
}

/// Rounds `value` to `scale` decimal places and pads it to exactly that scale.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{RoundingMode, round_currency};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rounded = round_currency(Decimal::from_str("320").unwrap(), 2, RoundingMode::HalfUp);
/// assert_eq!(rounded.to_string(), "320.00");
///
/// let rounded = round_currency(Decimal::from_str("10.005").unwrap(), 2, RoundingMode::HalfUp);
/// assert_eq!(rounded.to_string(), "10.01");
/// ```
pub fn round_currency(value: Decimal, scale: u32, mode: RoundingMode) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, mode.strategy());
    rounded.rescale(scale);
    rounded
}
