use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One request/response exchange with the database, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTrace {
    pub method: String,
    pub path: String,
    pub query: Map<String, Value>,
    /// Request body as sent.
    pub request_raw: String,
    /// Request body as parsed JSON.
    pub request_content: Value,
    /// Response body as received.
    pub response_raw: String,
    /// Response body as parsed JSON.
    pub response_content: Value,
    pub status_code: u16,
    pub response_headers: Map<String, Value>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl RequestTrace {
    /// Builds a trace for a JSON request and response, filling the raw
    /// bodies from the parsed ones.
    pub fn json_exchange(
        method: impl Into<String>,
        path: impl Into<String>,
        request: Value,
        status_code: u16,
        response: Value,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let mut response_headers = Map::new();
        response_headers.insert(
            "content-type".into(),
            Value::String("application/json;charset=utf-8".into()),
        );
        Self {
            method: method.into(),
            path: path.into(),
            query: Map::new(),
            request_raw: request.to_string(),
            request_content: request,
            response_raw: response.to_string(),
            response_content: response,
            status_code,
            response_headers,
            start_time,
            end_time,
        }
    }
}
