//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PayrollError;
use crate::models::NewEmployee;
use crate::store::PayrollStore;

use super::request::{CreatePayPeriodRequest, CreateTimeEntryRequest, SetEmployeeActiveRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: PayrollStore + Send + 'static,
{
    Router::new()
        .route("/employees", post(create_employee_handler::<S>))
        .route("/employees/:id/active", put(set_employee_active_handler::<S>))
        .route(
            "/employees/:id/time-entries",
            post(create_time_entry_handler::<S>).get(time_entries_for_employee_handler::<S>),
        )
        .route("/employees/:id/payroll", get(payroll_for_employee_handler::<S>))
        .route("/pay-periods", post(create_pay_period_handler::<S>))
        .route("/pay-periods/:id", delete(remove_pay_period_handler::<S>))
        .route("/pay-periods/:id/process", post(process_pay_period_handler::<S>))
        .route("/pay-periods/:id/payroll", get(payroll_for_period_handler::<S>))
        .with_state(state)
}

/// Handler for POST /employees.
///
/// Registers an employee and returns it, with its assigned id, as a 201.
async fn create_employee_handler<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();

    let employee = match payload {
        Ok(Json(employee)) => employee,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        employment_type = %employee.employment_type,
        "Adding employee"
    );

    let result = state
        .run_blocking(move |processor| processor.store_mut().add_employee(employee))
        .await;

    match result {
        Ok(employee) => {
            info!(correlation_id = %correlation_id, employee_id = employee.id, "Employee added");
            json_response(StatusCode::CREATED, &employee)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /employees/:id/active.
///
/// Inactive employees are left out of later payroll runs. Answers 204.
async fn set_employee_active_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SetEmployeeActiveRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let employee_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        employee_id,
        is_active = request.is_active,
        "Updating employee status"
    );

    let result = state
        .run_blocking(move |processor| {
            processor
                .store_mut()
                .set_employee_active(employee_id, request.is_active)
        })
        .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /employees/:id/time-entries.
///
/// Records one day of work and echoes the stored entry as a 201.
async fn create_time_entry_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateTimeEntryRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let employee_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let entry = match payload {
        Ok(Json(req)) => req.into_time_entry(employee_id),
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        employee_id,
        date_worked = %entry.date_worked,
        hours_worked = %entry.hours_worked,
        "Recording time entry"
    );

    let result = state
        .run_blocking(move |processor| {
            processor.store_mut().add_time_entry(entry.clone())?;
            Ok(entry)
        })
        .await;

    match result {
        Ok(entry) => json_response(StatusCode::CREATED, &entry),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id/time-entries.
///
/// Entries come back oldest first. An unknown employee has none.
async fn time_entries_for_employee_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let employee_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    let result = state
        .run_blocking(move |processor| processor.store().time_entries_for_employee(employee_id))
        .await;

    match result {
        Ok(entries) => json_response(StatusCode::OK, &entries),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:id/payroll.
///
/// The employee's pay history across processed periods, ordered by period start.
async fn payroll_for_employee_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let employee_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    let result = state
        .run_blocking(move |processor| processor.store().payroll_for_employee(employee_id))
        .await;

    match result {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /pay-periods.
///
/// Creates an open pay period and returns it with a 201.
async fn create_pay_period_handler<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreatePayPeriodRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        start_date = %request.start_date,
        end_date = %request.end_date,
        "Creating pay period"
    );

    let result = state
        .run_blocking(move |processor| {
            processor
                .store_mut()
                .add_pay_period(request.start_date, request.end_date)
        })
        .await;

    match result {
        Ok(period) => {
            info!(correlation_id = %correlation_id, pay_period_id = period.id, "Pay period created");
            json_response(StatusCode::CREATED, &period)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /pay-periods/:id.
///
/// Answers 204 once the period is gone.
async fn remove_pay_period_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let pay_period_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    info!(correlation_id = %correlation_id, pay_period_id, "Removing pay period");

    let result = state
        .run_blocking(move |processor| processor.store_mut().remove_pay_period(pay_period_id))
        .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /pay-periods/:id/process.
///
/// Runs payroll for the period and returns the run summary.
async fn process_pay_period_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let pay_period_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    info!(correlation_id = %correlation_id, pay_period_id, "Processing pay period");

    let result = state
        .run_blocking(move |processor| processor.run_for_period(pay_period_id))
        .await;

    match result {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %summary.run_id,
                paid_count = summary.paid_count,
                "Pay period processed"
            );
            json_response(StatusCode::OK, &summary)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /pay-periods/:id/payroll.
async fn payroll_for_period_handler<S>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: PayrollStore + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let pay_period_id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    let result = state
        .run_blocking(move |processor| {
            let store = processor.store();
            if store.get_pay_period(pay_period_id)?.is_none() {
                return Err(PayrollError::PayPeriodNotFound { id: pay_period_id });
            }
            store.payroll_for_period(pay_period_id)
        })
        .await;

    match result {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(err) => error_response(correlation_id, err),
    }
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(correlation_id: Uuid, err: ApiErrorResponse) -> Response {
    warn!(
        correlation_id = %correlation_id,
        status = err.status.as_u16(),
        code = %err.error.code,
        error = %err.error.message,
        "Request failed"
    );
    json_response(err.status, &err.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(correlation_id, ApiErrorResponse::bad_request(error))
}

fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let error = ApiError::with_details(
        "INVALID_PATH",
        "Path id must be an integer",
        rejection.body_text(),
    );
    error_response(correlation_id, ApiErrorResponse::bad_request(error))
}
