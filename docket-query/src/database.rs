//! The database collaborator interface.

use async_trait::async_trait;
use docket_types::WireValue;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::expr::Expr;
use crate::trace::RequestTrace;

/// Executes query expressions against a document database.
///
/// Implementations are expected to be safe for concurrent use; the core
/// issues one call per query and never retries.
#[async_trait]
pub trait Database: Send + Sync {
    /// Evaluates `expr`, returning the raw result.
    async fn query(&self, expr: Expr) -> Result<WireValue, DriverError>;
}

#[async_trait]
impl<T: Database + ?Sized> Database for Arc<T> {
    async fn query(&self, expr: Expr) -> Result<WireValue, DriverError> {
        (**self).query(expr).await
    }
}

/// An HTTP-level failure reported by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpFailure {
    pub message: String,
    pub trace: RequestTrace,
}

impl HttpFailure {
    pub fn new(message: impl Into<String>, trace: RequestTrace) -> Self {
        Self {
            message: message.into(),
            trace,
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure categories a database client raises.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("bad request: {0}")]
    BadRequest(HttpFailure),

    #[error("unauthorized: {0}")]
    Unauthorized(HttpFailure),

    #[error("permission denied: {0}")]
    PermissionDenied(HttpFailure),

    #[error("not found: {0}")]
    NotFound(HttpFailure),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(HttpFailure),

    #[error("internal error: {0}")]
    InternalError(HttpFailure),

    #[error("unavailable: {0}")]
    Unavailable(HttpFailure),

    /// The client refused a value before sending anything.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Anything else, including HTTP statuses without a category.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl DriverError {
    /// Categorizes an HTTP error response by status code.
    pub fn from_status(failure: HttpFailure) -> Self {
        match failure.trace.status_code {
            400 => Self::BadRequest(failure),
            401 => Self::Unauthorized(failure),
            403 => Self::PermissionDenied(failure),
            404 => Self::NotFound(failure),
            405 => Self::MethodNotAllowed(failure),
            500 => Self::InternalError(failure),
            503 => Self::Unavailable(failure),
            status => Self::other(format!("unexpected status {status}: {}", failure.message)),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Other(message.into())
    }
}
