//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load the payroll configuration from a YAML
//! file: the flat tax rate, how pay is rounded, and where the database and API live.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Tax rate: {}", config.tax_rate());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_CURRENCY_SCALE, DEFAULT_TAX_RATE, DatabaseConfig, MAX_CURRENCY_SCALE, PayrollConfig,
    ServerConfig,
};
