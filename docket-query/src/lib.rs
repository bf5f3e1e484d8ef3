//! Typed query execution for Docket.
//!
//! The database client is an external collaborator reached through the
//! [`Database`] trait. Its failures arrive as [`DriverError`]s and leave this
//! crate as values of the closed [`QueryError`] taxonomy; the [`Executor`]
//! never panics and never retries.
//!
//! # Components
//!
//! - **Expr**: the query expressions the core sends (`Exists`, `Create`, ...)
//! - **Database**: the collaborator interface plus its failure categories
//! - **Executor**: runs one expression and classifies its failure
//! - **MemoryDatabase**: an in-process collaborator for local runs
//! - **mock**: a scripted collaborator for tests (`test-util` feature)

mod database;
mod error;
mod executor;
mod expr;
mod memory;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod trace;

pub use database::{Database, DriverError, HttpFailure};
pub use error::{LocalErrorKind, QueryError, QueryResult, TransportErrorKind};
pub use executor::{classify, Executor};
pub use expr::Expr;
pub use memory::MemoryDatabase;
pub use trace::RequestTrace;
