//! Entity creation pipeline for Docket.
//!
//! Turns an untrusted input into a stored, re-validated document:
//!
//! 1. **Decoding**: validate the input against the record codec
//! 2. **CheckingExistence**: ask whether the target collection exists
//! 3. **Provisioning**: create the target and owner collections, only if missing
//! 4. **Writing**: create the document, stamped with `createdAt` and `owner`
//! 5. **DecodingResult**: validate the database's answer as a [`Document`]
//!
//! The first failure ends the run. Input that fails to decode never reaches
//! the database.
//!
//! [`Document`]: docket_codec::Document

mod config;
mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{Pipeline, Stage};
