//! Runs one query and turns every failure into a [`QueryError`].

use docket_types::WireValue;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::database::{Database, DriverError};
use crate::error::{QueryError, QueryResult, TransportErrorKind};
use crate::expr::Expr;

/// Wraps a [`Database`] so that queries return a [`QueryResult`] instead of
/// a driver error or a panic.
#[derive(Debug, Clone)]
pub struct Executor<Db> {
    db: Db,
}

impl<Db: Database> Executor<Db> {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Db {
        &self.db
    }

    /// Executes `expr` with exactly one collaborator call.
    ///
    /// A panic raised while the collaborator builds or awaits the request is
    /// caught and reported as `unknownError`.
    pub async fn query(&self, expr: Expr) -> QueryResult<WireValue> {
        debug!(query = %expr, "executing query");
        let outcome = AssertUnwindSafe(async { self.db.query(expr).await })
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(driver_error)) => classify(driver_error),
            Err(panic) => QueryError::unknown(panic_message(panic.as_ref())),
        };
        warn!(error = error.name(), message = error.message(), "query failed");
        Err(error)
    }
}

/// Maps a driver failure onto the taxonomy.
///
/// Categories are checked in a fixed order: bad request, unauthorized,
/// permission denied, not found, method not allowed, internal,
/// unavailable, invalid value, then everything else as unknown.
pub fn classify(error: DriverError) -> QueryError {
    let (kind, failure) = match error {
        DriverError::BadRequest(failure) => (TransportErrorKind::BadRequest, failure),
        DriverError::Unauthorized(failure) => (TransportErrorKind::Unauthorized, failure),
        DriverError::PermissionDenied(failure) => (TransportErrorKind::PermissionDenied, failure),
        DriverError::NotFound(failure) => (TransportErrorKind::NotFound, failure),
        DriverError::MethodNotAllowed(failure) => (TransportErrorKind::MethodNotAllowed, failure),
        DriverError::InternalError(failure) => (TransportErrorKind::InternalError, failure),
        DriverError::Unavailable(failure) => (TransportErrorKind::Unavailable, failure),
        DriverError::InvalidValue(message) => return QueryError::invalid_value(message),
        DriverError::Other(source) => return QueryError::unknown(source.to_string()),
    };
    QueryError::transport(kind, failure.message, failure.trace)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("query panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("query panicked: {message}")
    } else {
        "query panicked".to_string()
    }
}
