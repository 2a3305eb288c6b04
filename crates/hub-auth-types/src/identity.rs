//! Authorization gate extractors.
//!
//! The access token is read from the `hub_access_token` cookie, falling back
//! to an `Authorization: Bearer` header. Rejections render the standard
//! envelope, so a handler behind [`Identity`] or [`AdminIdentity`] never runs
//! for an unauthenticated or unprivileged caller.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use http::header::AUTHORIZATION;
use http::request::Parts;
use uuid::Uuid;

use hub_core::error::ApiError;
use hub_domain::user::Actor;

use crate::admin::AdminAllowList;
use crate::cookie::HUB_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// Everything the gate needs. Obtained from app state via [`FromRef`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    pub jwt_secret: Arc<str>,
    pub admins: AdminAllowList,
}

impl AuthGate {
    pub fn new(jwt_secret: impl Into<Arc<str>>, admins: AdminAllowList) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            admins,
        }
    }

    /// Resolve the caller from request headers. `None` when no token is sent
    /// or it fails validation.
    pub fn resolve(&self, headers: &http::HeaderMap) -> Option<Identity> {
        let token = bearer_or_cookie(headers)?;
        match validate_access_token(&token, &self.jwt_secret) {
            Ok(info) => Some(Identity {
                is_admin: self.admins.contains(&info.email),
                user_id: info.user_id,
                email: info.email,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "rejected access token");
                None
            }
        }
    }
}

fn bearer_or_cookie(headers: &http::HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(HUB_ACCESS_TOKEN) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

// axum-core 0.5 defines this as `fn -> impl Future + Send`. Extract synchronously
// and return a 'static async block.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AuthGate: FromRef<S>,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = AuthGate::from_ref(state).resolve(&parts.headers);
        async move { identity.ok_or_else(ApiError::unauthorized) }
    }
}

/// Caller identity for public endpoints that personalize their output.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(Identity::actor)
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    AuthGate: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = AuthGate::from_ref(state).resolve(&parts.headers);
        async move { Ok(Self(identity)) }
    }
}

/// A caller whose email is on the admin allow-list.
///
/// Unauthenticated callers get 1002, authenticated non-admins 1003.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
    AuthGate: FromRef<S>,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = AuthGate::from_ref(state).resolve(&parts.headers);
        async move {
            let identity = identity.ok_or_else(ApiError::unauthorized)?;
            if !identity.is_admin {
                tracing::debug!(user_id = %identity.user_id, "admin access denied");
                return Err(ApiError::forbidden());
            }
            Ok(Self(identity))
        }
    }
}
