//! The closed query error taxonomy.
//!
//! Consumers branch on these enums with exhaustive `match`es and no
//! wildcard arms, so adding a variant fails to compile until every consumer
//! handles it.

use docket_codec::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::trace::RequestTrace;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Failures reported by the database over its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportErrorKind {
    BadRequest,
    Unauthorized,
    PermissionDenied,
    NotFound,
    MethodNotAllowed,
    InternalError,
    #[serde(rename = "unavailableError")]
    Unavailable,
}

impl TransportErrorKind {
    pub const ALL: [Self; 7] = [
        Self::BadRequest,
        Self::Unauthorized,
        Self::PermissionDenied,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::InternalError,
        Self::Unavailable,
    ];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::PermissionDenied => "permissionDenied",
            Self::NotFound => "notFound",
            Self::MethodNotAllowed => "methodNotAllowed",
            Self::InternalError => "internalError",
            Self::Unavailable => "unavailableError",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised on this side of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocalErrorKind {
    /// A value failed domain validation.
    InvalidValue,
    /// A failure the collaborator did not categorize.
    UnknownError,
}

impl LocalErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidValue => "invalidValue",
            Self::UnknownError => "unknownError",
        }
    }
}

impl fmt::Display for LocalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a query can fail.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryError {
    /// The database answered with an error. Carries the full exchange.
    #[error("{kind}: {message}")]
    Transport {
        #[serde(rename = "name")]
        kind: TransportErrorKind,
        message: String,
        #[serde(rename = "requestTrace")]
        trace: Box<RequestTrace>,
    },

    /// The failure never reached, or did not come from, the database.
    #[error("{kind}: {message}")]
    Local {
        #[serde(rename = "name")]
        kind: LocalErrorKind,
        message: String,
    },
}

impl QueryError {
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>, trace: RequestTrace) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
            trace: Box::new(trace),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::Local {
            kind: LocalErrorKind::InvalidValue,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Local {
            kind: LocalErrorKind::UnknownError,
            message: message.into(),
        }
    }

    /// Wire name of the variant, e.g. `"permissionDenied"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transport { kind, .. } => kind.as_str(),
            Self::Local { kind, .. } => kind.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. } | Self::Local { message, .. } => message,
        }
    }

    /// The request/response exchange, present only for transport failures.
    pub fn trace(&self) -> Option<&RequestTrace> {
        match self {
            Self::Transport { trace, .. } => Some(trace),
            Self::Local { .. } => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<ValidationErrors> for QueryError {
    fn from(errors: ValidationErrors) -> Self {
        Self::invalid_value(errors.to_string())
    }
}
