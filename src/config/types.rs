//! Configuration types for payroll runs.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::RoundingMode;
use crate::error::{PayrollError, PayrollResult};

/// Flat tax rate applied when the configuration does not set one (15%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Minor-unit precision of the currency when the configuration does not set one.
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Largest currency scale accepted.
pub const MAX_CURRENCY_SCALE: u32 = 10;

fn default_tax_rate() -> Decimal {
    DEFAULT_TAX_RATE
}

fn default_currency_scale() -> u32 {
    DEFAULT_CURRENCY_SCALE
}

/// SQLite connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// How long to wait on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("payroll.db")
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Everything a payroll run and the service around it need to know.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayrollConfig {
    /// Flat tax rate deducted from gross pay, as a fraction in `[0, 1)`.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// Number of decimal places pay figures are rounded to when written.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
    /// How pay figures are rounded to `currency_scale`.
    #[serde(default)]
    pub rounding: RoundingMode,
    /// Storage settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// API settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            currency_scale: DEFAULT_CURRENCY_SCALE,
            rounding: RoundingMode::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl PayrollConfig {
    /// Returns a copy of this configuration with a different tax rate.
    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Rejects values a payroll run cannot use.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            return Err(PayrollError::ConfigInvalid {
                field: "tax_rate".to_string(),
                message: format!("must be in [0, 1), got {}", self.tax_rate),
            });
        }
        if self.currency_scale > MAX_CURRENCY_SCALE {
            return Err(PayrollError::ConfigInvalid {
                field: "currency_scale".to_string(),
                message: format!(
                    "must be at most {}, got {}",
                    MAX_CURRENCY_SCALE, self.currency_scale
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_tax_rate_is_fifteen_percent() {
        assert_eq!(DEFAULT_TAX_RATE, Decimal::from_str("0.15").unwrap());
        assert_eq!(PayrollConfig::default().tax_rate, DEFAULT_TAX_RATE);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: PayrollConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, PayrollConfig::default());
    }

    #[test]
    fn test_partial_yaml_overrides_fields() {
        let yaml = r#"
tax_rate: "0.2"
rounding: truncate
database:
  path: /var/lib/payroll/payroll.db
"#;
        let config: PayrollConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tax_rate, Decimal::from_str("0.2").unwrap());
        assert_eq!(config.rounding, RoundingMode::Truncate);
        assert_eq!(config.database.path, PathBuf::from("/var/lib/payroll/payroll.db"));
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.currency_scale, 2);
    }

    #[test]
    fn test_validate_rejects_tax_rate_of_one() {
        let config = PayrollConfig::default().with_tax_rate(Decimal::ONE);
        assert!(matches!(
            config.validate(),
            Err(PayrollError::ConfigInvalid { ref field, .. }) if field == "tax_rate"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_tax_rate() {
        let config = PayrollConfig::default().with_tax_rate(Decimal::from_str("-0.1").unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_zero_tax_rate() {
        let config = PayrollConfig::default().with_tax_rate(Decimal::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_large_scale() {
        let config = PayrollConfig {
            currency_scale: 28,
            ..PayrollConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PayrollError::ConfigInvalid { ref field, .. }) if field == "currency_scale"
        ));
    }
}
