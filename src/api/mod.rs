//! HTTP API module for the Payroll Engine.
//!
//! This module exposes employee and time entry recording, pay period management,
//! payroll runs and the resulting payroll records over a small REST API.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CreatePayPeriodRequest, CreateTimeEntryRequest, SetEmployeeActiveRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
