use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use hub_auth_types::identity::{Identity, MaybeIdentity};
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath};

use crate::error::ApiServiceError;
use crate::state::AppState;
use crate::usecase::rating::{RateResourceUseCase, RatingSummaryUseCase, RemoveRatingUseCase};

// ── PUT /api/resources/{id}/rating ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct RateRequest {
    pub value: i64,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %id))]
pub async fn rate_resource(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<RateRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = RateResourceUseCase {
        ratings: state.rating_repo(),
        resources: state.resource_repo(),
    };
    let summary = uc.execute(identity.actor(), id, body.value).await?;
    Ok(ApiResponse(summary))
}

// ── DELETE /api/resources/{id}/rating ────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %id))]
pub async fn remove_rating(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = RemoveRatingUseCase {
        ratings: state.rating_repo(),
    };
    let summary = uc.execute(identity.user_id, id).await?;
    Ok(ApiResponse(summary))
}

// ── GET /api/resources/{id}/rating ───────────────────────────────────────────

#[tracing::instrument(skip_all, fields(resource_id = %id))]
pub async fn rating_summary(
    State(state): State<AppState>,
    identity: MaybeIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = RatingSummaryUseCase {
        ratings: state.rating_repo(),
        resources: state.resource_repo(),
    };
    let summary = uc.execute(id, identity.actor()).await?;
    Ok(ApiResponse(summary))
}
