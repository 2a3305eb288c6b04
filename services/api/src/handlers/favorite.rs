use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_auth_types::identity::Identity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};

use crate::domain::types::FavoriteEntry;
use crate::error::ApiServiceError;
use crate::handlers::resource::{PageQuery, ResourceResponse};
use crate::state::AppState;
use crate::usecase::favorite::{
    AddFavoriteUseCase, FavoriteStatusUseCase, ListFavoritesUseCase, RemoveFavoriteUseCase,
};

#[derive(Serialize)]
pub struct FavoritedResponse {
    pub favorited: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub resource: ResourceResponse,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub favorited_at: chrono::DateTime<chrono::Utc>,
}

impl From<FavoriteEntry> for FavoriteResponse {
    fn from(entry: FavoriteEntry) -> Self {
        Self {
            resource: ResourceResponse::listed(entry.resource),
            favorited_at: entry.favorited_at,
        }
    }
}

// ── POST /api/favorites ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub resource_id: Uuid,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %body.resource_id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<AddFavoriteRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = AddFavoriteUseCase {
        favorites: state.favorite_repo(),
        resources: state.resource_repo(),
    };
    let favorited = uc.execute(identity.actor(), body.resource_id).await?;
    Ok(ApiResponse(FavoritedResponse { favorited }))
}

// ── DELETE /api/favorites/{resourceId} ───────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %resource_id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(resource_id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = RemoveFavoriteUseCase {
        favorites: state.favorite_repo(),
    };
    let favorited = uc.execute(identity.user_id, resource_id).await?;
    Ok(ApiResponse(FavoritedResponse { favorited }))
}

// ── GET /api/favorites/{resourceId} ──────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %resource_id))]
pub async fn favorite_status(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(resource_id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = FavoriteStatusUseCase {
        favorites: state.favorite_repo(),
    };
    let favorited = uc.execute(identity.user_id, resource_id).await?;
    Ok(ApiResponse(FavoritedResponse { favorited }))
}

// ── GET /api/favorites ───────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_favorites(
    State(state): State<AppState>,
    identity: Identity,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListFavoritesUseCase {
        favorites: state.favorite_repo(),
    };
    let favorites = uc.execute(identity.user_id, query.page_request()).await?;
    Ok(ApiResponse(favorites.map(FavoriteResponse::from)))
}
