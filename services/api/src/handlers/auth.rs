use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use hub_auth_types::cookie::{clear_access_token_cookie, set_access_token_cookie};
use hub_core::envelope::ApiResponse;
use hub_core::extract::ValidJson;

use crate::error::ApiServiceError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    CreateAuthcodeInput, CreateAuthcodeUseCase, CreateTokenInput, CreateTokenUseCase,
};

// ── POST /api/auth/code ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAuthcodeRequest {
    pub email: String,
}

#[tracing::instrument(skip_all)]
pub async fn create_authcode(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateAuthcodeRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateAuthcodeUseCase {
        auth_codes: state.auth_code_repo(),
        mailer: state.mailer.clone(),
    };
    uc.execute(CreateAuthcodeInput { email: body.email }).await?;
    Ok(ApiResponse(json!({ "sent": true })))
}

// ── POST /api/auth/token ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: u64,
    pub user: UserResponse,
    pub created: bool,
}

#[tracing::instrument(skip_all)]
pub async fn create_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(body): ValidJson<CreateTokenRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateTokenUseCase {
        users: state.user_repo(),
        auth_codes: state.auth_code_repo(),
        jwt_secret: state.jwt_secret(),
        signup_bonus: state.signup_bonus,
    };
    let out = uc
        .execute(CreateTokenInput {
            email: body.email,
            code: body.code,
        })
        .await?;

    let is_admin = state.gate.admins.contains(&out.user.email);
    let jar = set_access_token_cookie(jar, out.access_token.clone(), state.cookie_domain.clone());
    Ok((
        jar,
        ApiResponse(TokenResponse {
            access_token: out.access_token,
            expires_at: out.expires_at,
            user: UserResponse::new(out.user, is_admin),
            created: out.created,
        }),
    ))
}

// ── DELETE /api/auth/token ───────────────────────────────────────────────────

pub async fn revoke_token(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_access_token_cookie(jar, state.cookie_domain.clone());
    (jar, ApiResponse(json!({ "loggedOut": true })))
}
