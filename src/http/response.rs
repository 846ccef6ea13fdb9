//! Response envelopes.
//!
//! Availability answers always use the same shape so the browser can tell
//! success from failure without inspecting the status code:
//!
//! ```text
//! 200 { "success": true,  "data": <LibCal JSON>, "debug": { ... } }
//! 500 { "success": false, "error": "<message>",  "debug": { ... } }
//! ```
//!
//! Everything else that fails (405, 404) answers `{ "error": "<message>" }`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;

use crate::libcal::{DateRange, RoomIds};

/// Enough context to replay an availability call by hand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub request_id: String,
    pub request_params: RoomIds,
    pub dates: Option<DateRange>,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<&'static str>,
}

/// Result of one availability call.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub debug: Diagnostics,
}

impl AvailabilityEnvelope {
    pub fn ok(data: Value, debug: Diagnostics) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            debug,
        }
    }

    pub fn failed(error: impl Into<String>, debug: Diagnostics) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            debug,
        }
    }
}

impl IntoResponse for AvailabilityEnvelope {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// `{ "error": message }` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// 405 for anything but GET and POST on the availability routes.
pub fn method_not_allowed() -> Response {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
    response
}
