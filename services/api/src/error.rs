use axum::response::{IntoResponse, Response};

use hub_core::error::{ApiError, ErrorCode};
use hub_domain::resource::InvalidTransition;

/// API service error variants. Each maps to exactly one envelope code.
#[derive(Debug, thiserror::Error)]
pub enum ApiServiceError {
    #[error("resource not found")]
    ResourceNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("batch task not found")]
    BatchTaskNotFound,
    #[error("{0}")]
    InvalidParams(String),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid or expired code")]
    InvalidAuthcode,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("forbidden")]
    Forbidden,
    #[error("resource is locked")]
    ResourceLocked,
    #[error("too many codes requested, try again later")]
    TooManyAuthcodes,
    #[error("state changed, please retry")]
    StateChanged,
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("category still has children or resources")]
    CategoryInUse,
    #[error("order is not pending")]
    OrderNotPending,
    #[error("insufficient credits")]
    InsufficientCredits,
    #[error("enrichment not configured")]
    EnrichmentDisabled,
    #[error("database error")]
    Database(#[source] anyhow::Error),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ResourceNotFound
            | Self::CategoryNotFound
            | Self::TagNotFound
            | Self::OrderNotFound
            | Self::UserNotFound
            | Self::BatchTaskNotFound => ErrorCode::NotFound,
            Self::InvalidParams(_) | Self::InvalidTransition(_) => ErrorCode::InvalidParams,
            Self::Unauthorized | Self::InvalidAuthcode | Self::InvalidSignature => {
                ErrorCode::Unauthorized
            }
            Self::Forbidden | Self::ResourceLocked => ErrorCode::Forbidden,
            Self::TooManyAuthcodes => ErrorCode::RateLimited,
            Self::StateChanged | Self::Duplicate(_) | Self::CategoryInUse | Self::OrderNotPending => {
                ErrorCode::Conflict
            }
            Self::InsufficientCredits => ErrorCode::InsufficientCredits,
            Self::EnrichmentDisabled | Self::Internal(_) => ErrorCode::InternalError,
            Self::Database(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn is_server_error(&self) -> bool {
        self.code().is_server_error()
    }
}

impl From<ApiError> for ApiServiceError {
    fn from(e: ApiError) -> Self {
        match e.code {
            ErrorCode::Unauthorized => Self::Unauthorized,
            ErrorCode::Forbidden => Self::Forbidden,
            _ => Self::InvalidParams(e.message.into_owned()),
        }
    }
}

impl IntoResponse for ApiServiceError {
    fn into_response(self) -> Response {
        let code = self.code();
        // TraceLayer already records method/uri/status. Server errors need the
        // anyhow chain so the root cause is traceable; 4xx only at debug.
        match &self {
            Self::Database(e) | Self::Internal(e) => {
                tracing::error!(error = ?e, code = code.as_i32(), "request failed");
            }
            other => {
                tracing::debug!(error = %other, code = code.as_i32(), "request rejected");
            }
        }
        let message = if code.is_server_error() && !matches!(self, Self::EnrichmentDisabled) {
            code.default_message().to_owned()
        } else {
            self.to_string()
        };
        ApiError::with_message(code, message).into_response()
    }
}

/// Attach a context string to a store error and classify it as a database failure.
pub trait DbContext<T> {
    fn db_context(self, context: &'static str) -> Result<T, ApiServiceError>;
}

impl<T, E> DbContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn db_context(self, context: &'static str) -> Result<T, ApiServiceError> {
        self.map_err(|e| ApiServiceError::Database(anyhow::Error::new(e).context(context)))
    }
}
