use std::borrow::Cow;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::envelope::Envelope;

/// Envelope codes shared by every endpoint.
///
/// `Ok` is the only success code. Every failure code maps to exactly one HTTP
/// status through [`ErrorCode::http_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    InternalError,
    InvalidParams,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    DatabaseError,
    Conflict,
    InsufficientCredits,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 10] = [
        Self::Ok,
        Self::InternalError,
        Self::InvalidParams,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::RateLimited,
        Self::DatabaseError,
        Self::Conflict,
        Self::InsufficientCredits,
    ];

    /// Wire value carried in the envelope `code` field.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::InternalError => 1000,
            Self::InvalidParams => 1001,
            Self::Unauthorized => 1002,
            Self::Forbidden => 1003,
            Self::NotFound => 1004,
            Self::RateLimited => 1005,
            Self::DatabaseError => 1006,
            Self::Conflict => 1007,
            Self::InsufficientCredits => 1008,
        }
    }

    pub fn from_i32(v: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_i32() == v)
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::InvalidParams => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InsufficientCredits => StatusCode::PAYMENT_REQUIRED,
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic client-facing message. 5xx codes never carry anything more specific.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InternalError => "internal server error",
            Self::InvalidParams => "invalid parameters",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::RateLimited => "too many requests",
            Self::DatabaseError => "database error",
            Self::Conflict => "conflict",
            Self::InsufficientCredits => "insufficient credits",
        }
    }

    pub fn is_server_error(self) -> bool {
        self.http_status().is_server_error()
    }
}

impl ::serde::Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ::serde::Serializer,
    {
        serializer.serialize_i32(self.as_i32())
    }
}

/// A failure already reduced to its envelope form.
///
/// Extractor rejections and the shared gate use this directly; services keep
/// their own richer error enum and convert into `ApiError` when rendering.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(code.default_message()),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorCode::Forbidden)
    }

    pub fn invalid_params(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorCode::InvalidParams, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body = Envelope::<()>::failure(self.code, self.message);
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn should_pair_every_code_with_a_fixed_status() {
        let expected = [
            (0, 200),
            (1000, 500),
            (1001, 400),
            (1002, 401),
            (1003, 403),
            (1004, 404),
            (1005, 429),
            (1006, 500),
            (1007, 409),
            (1008, 402),
        ];
        for (code, status) in expected {
            let parsed = ErrorCode::from_i32(code).unwrap();
            assert_eq!(parsed.http_status().as_u16(), status, "code {code}");
        }
    }

    #[test]
    fn should_round_trip_wire_values() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_i32(code.as_i32()), Some(code));
        }
        assert_eq!(ErrorCode::from_i32(42), None);
    }

    #[test]
    fn should_serialize_code_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "1004");
    }

    #[tokio::test]
    async fn unauthorized_renders_envelope_without_data() {
        let resp = ApiError::unauthorized().into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["code"], 1002);
        assert_eq!(json["message"], "unauthorized");
        assert!(json.get("data").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn not_found_renders_404() {
        let resp = ApiError::new(ErrorCode::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["code"], 1004);
    }

    #[tokio::test]
    async fn invalid_params_keeps_custom_message() {
        let resp = ApiError::invalid_params("page must be a number").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["code"], 1001);
        assert_eq!(json["message"], "page must be a number");
    }
}
