//! Shared test helpers for query tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use docket_query::{HttpFailure, RequestTrace};
use serde_json::json;

pub fn fixed_time() -> DateTime<Utc> {
    "2020-04-13T19:51:19.487Z".parse().unwrap()
}

/// A trace for a failed request with the given status.
pub fn trace(status_code: u16) -> RequestTrace {
    RequestTrace::json_exchange(
        "POST",
        "/",
        json!({ "exists": { "collection": "products" } }),
        status_code,
        json!({ "errors": [{ "code": "test", "description": "test failure" }] }),
        fixed_time(),
        fixed_time(),
    )
}

pub fn failure(status_code: u16, message: &str) -> HttpFailure {
    HttpFailure::new(message, trace(status_code))
}
