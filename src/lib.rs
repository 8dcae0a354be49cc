//! Payroll Engine
//!
//! This crate runs payroll for a pay period: it aggregates each active employee's
//! recorded hours inside the period, computes gross pay and flat-tax net pay with exact
//! decimal arithmetic, persists one payroll record per employee and closes the period.
//! A closed period is never paid twice, and a failed run leaves nothing behind.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod processor;
pub mod store;
