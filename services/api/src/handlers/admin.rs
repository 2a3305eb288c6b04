use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use hub_auth_types::identity::AdminIdentity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};
use hub_domain::pagination::PageRequest;
use hub_domain::resource::{ResourceStatus, ReviewAction};

use crate::error::ApiServiceError;
use crate::handlers::resource::ResourceResponse;
use crate::state::AppState;
use crate::usecase::admin::{
    EnrichResourceUseCase, ModerationQueueUseCase, ReviewInput, ReviewResourceUseCase,
    StatsUseCase, ToggleTopUseCase,
};

// ── GET /api/admin/resources ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModerationQuery {
    pub status: Option<ResourceStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn moderation_queue(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidQuery(query): ValidQuery<ModerationQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let page = PageRequest::from_query(query.page, query.page_size, query.limit, query.offset);
    let uc = ModerationQueueUseCase {
        repo: state.resource_repo(),
    };
    let resources = uc.execute(query.status, page).await?;
    Ok(ApiResponse(resources.map(ResourceResponse::managed)))
}

// ── POST /api/admin/resources/{id}/review ────────────────────────────────────

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    pub reason: Option<String>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, resource_id = %id))]
pub async fn review_resource(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<ReviewRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ReviewResourceUseCase {
        repo: state.resource_repo(),
    };
    let resource = uc
        .execute(
            admin.actor(),
            id,
            ReviewInput {
                action: body.action,
                reason: body.reason,
            },
        )
        .await?;
    Ok(ApiResponse(ResourceResponse::managed(resource)))
}

// ── POST /api/admin/resources/{id}/toggle-top ────────────────────────────────

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, resource_id = %id))]
pub async fn toggle_top(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ToggleTopUseCase {
        repo: state.resource_repo(),
    };
    let is_top = uc.execute(id).await?;
    Ok(ApiResponse(json!({ "isTop": is_top })))
}

// ── GET /api/admin/stats ─────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn stats(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = StatsUseCase {
        stats: state.stats_repo(),
    };
    Ok(ApiResponse(uc.execute().await?))
}

// ── POST /api/admin/resources/{id}/enrich ────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichResponse {
    pub ai_summary: String,
    pub ai_score: i32,
    pub suggested_tags: Vec<String>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, resource_id = %id))]
pub async fn enrich_resource(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = EnrichResourceUseCase {
        repo: state.resource_repo(),
        enricher: state.enricher(),
    };
    let out = uc.execute(id).await?;
    Ok(ApiResponse(EnrichResponse {
        ai_summary: out.summary,
        ai_score: out.score,
        suggested_tags: out.suggested_tags,
    }))
}
