//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the payroll
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::calculation::RoundingMode;
use crate::error::{PayrollError, PayrollResult};

use super::types::PayrollConfig;

/// Loads and provides access to the payroll configuration.
///
/// # File Format
///
/// ```yaml
/// tax_rate: "0.15"      # flat deduction applied to gross pay
/// currency_scale: 2     # decimal places pay is rounded to
/// rounding: half_up     # half_up | half_even | truncate
/// database:
///   path: payroll.db
///   busy_timeout_secs: 5
/// server:
///   listen_addr: 127.0.0.1:8080
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Tax rate: {}", loader.tax_rate());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML (`ConfigParseError`)
    /// - A value is out of range (`ConfigInvalid`)
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let config = Self::load_yaml::<PayrollConfig>(path.as_ref())?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: PayrollConfig) -> PayrollResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Returns the flat tax rate.
    pub fn tax_rate(&self) -> Decimal {
        self.config.tax_rate
    }

    /// Returns the rounding mode for pay figures.
    pub fn rounding(&self) -> RoundingMode {
        self.config.rounding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/payroll.yaml"
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tax_rate(), Decimal::from_str("0.15").unwrap());
        assert_eq!(loader.rounding(), RoundingMode::HalfUp);
        assert_eq!(loader.config().currency_scale, 2);
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let result = ConfigLoader::load("/nonexistent/payroll.yaml");
        match result {
            Err(PayrollError::ConfigNotFound { path }) => {
                assert!(path.contains("payroll.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let file = write_temp("tax_rate: [not, a, number");
        let result = ConfigLoader::load(file.path());
        assert!(matches!(result, Err(PayrollError::ConfigParseError { .. })));
    }

    #[test]
    fn test_load_unknown_rounding_mode_returns_parse_error() {
        let file = write_temp("rounding: bankers\n");
        let result = ConfigLoader::load(file.path());
        assert!(matches!(result, Err(PayrollError::ConfigParseError { .. })));
    }

    #[test]
    fn test_load_out_of_range_tax_rate_returns_invalid() {
        let file = write_temp("tax_rate: \"1.5\"\n");
        let result = ConfigLoader::load(file.path());
        assert!(matches!(result, Err(PayrollError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_load_custom_tax_rate() {
        let file = write_temp("tax_rate: \"0.30\"\nrounding: half_even\n");
        let loader = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(loader.tax_rate(), Decimal::from_str("0.30").unwrap());
        assert_eq!(loader.rounding(), RoundingMode::HalfEven);
    }

    #[test]
    fn test_from_config_validates() {
        let config = PayrollConfig::default().with_tax_rate(Decimal::TWO);
        assert!(ConfigLoader::from_config(config).is_err());
    }
}
