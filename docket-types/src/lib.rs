//! Core type definitions for Docket.
//!
//! This crate defines the values exchanged with the document database:
//! - [`WireValue`], the tagged value tree returned by the driver
//! - [`NativeTime`] and [`NativeRef`], the driver's in-process time and reference values
//! - [`DocRef`], the flat `{id, collection}` form of a document reference
//!
//! A wire value reaches the codecs in one of two shapes. Values produced by the
//! driver in-process carry `Time`/`Ref` variants; values that crossed a JSON
//! boundary carry the same information as plain `{"@ts": ..}` / `{"@ref": ..}`
//! objects. Codecs accept both.

mod refs;
mod timestamp;
mod wire;

pub use refs::{DocRef, NativeRef, COLLECTIONS};
pub use timestamp::{format_iso, parse_iso, NativeTime};
pub use wire::{WireValue, REF_KEY, TS_KEY};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
