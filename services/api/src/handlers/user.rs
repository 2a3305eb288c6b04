use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use hub_auth_types::identity::{AdminIdentity, Identity};
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidQuery};
use hub_domain::pagination::PageRequest;

use crate::domain::types::User;
use crate::error::ApiServiceError;
use crate::state::AppState;
use crate::usecase::user::{GetMeUseCase, ListUsersUseCase, UpdateMeInput, UpdateMeUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub credits: i64,
    pub is_admin: bool,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    pub fn new(user: User, is_admin: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            credits: user.credits,
            is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetMeUseCase {
        repo: state.user_repo(),
    };
    let user = uc.execute(identity.user_id).await?;
    Ok(ApiResponse(UserResponse::new(user, identity.is_admin)))
}

// ── PATCH /api/users/me ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn update_me(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<UpdateMeRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = UpdateMeUseCase {
        repo: state.user_repo(),
    };
    let user = uc
        .execute(
            identity.user_id,
            UpdateMeInput {
                name: body.name,
                avatar_url: body.avatar_url,
            },
        )
        .await?;
    Ok(ApiResponse(UserResponse::new(user, identity.is_admin)))
}

// ── GET /api/admin/users ─────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidQuery(query): ValidQuery<UserListQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let page = PageRequest::from_query(query.page, query.page_size, query.limit, query.offset);
    let uc = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let users = uc.execute(query.search.as_deref(), page).await?;
    let admins = &state.gate.admins;
    Ok(ApiResponse(users.map(|u| {
        let is_admin = admins.contains(&u.email);
        UserResponse::new(u, is_admin)
    })))
}
