//! The `{ code, message, data?, timestamp }` response envelope.

use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorCode;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: ErrorCode,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(serialize_with = "crate::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Ok,
            message: Cow::Borrowed(ErrorCode::Ok.default_message()),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}

/// Successful handler output. Always rendered with `code: 0` and HTTP 200.
#[derive(Debug)]
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = ErrorCode::Ok.http_status();
        (status, axum::Json(Envelope::success(self.0))).into_response()
    }
}
