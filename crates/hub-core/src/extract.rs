//! Extractors whose rejections render the envelope with code 1001.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body. Malformed or mistyped input becomes an `InvalidParams` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let extract = Json::<T>::from_request(req, state);
        async move {
            extract
                .await
                .map(|Json(value)| Self(value))
                .map_err(|rej| ApiError::invalid_params(rej.body_text()))
        }
    }
}

/// Query string parsed with `serde_qs`, so nested and repeated keys work.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let raw = parts.uri.query().unwrap_or_default();
        let parsed = serde_qs::from_str::<T>(raw)
            .map(Self)
            .map_err(|e| ApiError::invalid_params(format!("invalid query: {e}")));
        async move { parsed }
    }
}

/// Path parameters. A malformed id is a client error, not a 404.
#[derive(Debug, Clone, Copy)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let extract = Path::<T>::from_request_parts(parts, state);
        async move {
            extract
                .await
                .map(|Path(value)| Self(value))
                .map_err(|rej| ApiError::invalid_params(rej.body_text()))
        }
    }
}
