//! Application state for the Payroll Engine API.
//!
//! Runs are synchronous and hold a storage transaction for their whole duration, so
//! the processor sits behind a mutex and every store call is moved onto the blocking
//! thread pool.

use std::sync::{Arc, Mutex};

use tracing::{error, warn};

use crate::error::PayrollResult;
use crate::processor::PayrollProcessor;
use crate::store::PayrollStore;

use super::response::ApiErrorResponse;

/// Shared application state.
///
/// Holds the payroll processor shared by all request handlers.
pub struct AppState<S> {
    processor: Arc<Mutex<PayrollProcessor<S>>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
        }
    }
}

impl<S> AppState<S>
where
    S: PayrollStore + Send + 'static,
{
    /// Creates a new application state around `processor`.
    pub fn new(processor: PayrollProcessor<S>) -> Self {
        Self {
            processor: Arc::new(Mutex::new(processor)),
        }
    }

    /// Runs `f` against the processor on the blocking thread pool.
    ///
    /// Payroll errors are mapped to their HTTP responses and a panicked task becomes
    /// a 500. A lock poisoned by an earlier panic is recovered: the panicking run's
    /// transaction was dropped during unwinding, so the store holds no partial work.
    pub async fn run_blocking<T, F>(&self, f: F) -> Result<T, ApiErrorResponse>
    where
        F: FnOnce(&mut PayrollProcessor<S>) -> PayrollResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let processor = Arc::clone(&self.processor);
        let joined = tokio::task::spawn_blocking(move || -> Result<T, ApiErrorResponse> {
            let mut guard = processor.lock().unwrap_or_else(|poisoned| {
                warn!("Recovering payroll processor lock poisoned by a panicked request");
                processor.clear_poison();
                poisoned.into_inner()
            });
            f(&mut *guard).map_err(ApiErrorResponse::from)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "Blocking payroll task failed");
                Err(ApiErrorResponse::internal("Payroll task failed"))
            }
        }
    }
}
