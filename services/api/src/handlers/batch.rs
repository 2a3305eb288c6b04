use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_auth_types::identity::Identity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath};

use crate::domain::types::{BatchFailure, BatchStatus, BatchTask, ResourceInput};
use crate::error::ApiServiceError;
use crate::state::AppState;
use crate::usecase::batch::{
    GetBatchUseCase, ListBatchesUseCase, ResumeBatchUseCase, StartBatchUseCase,
};

/// Progress view of a batch task. The submitted items are not echoed back.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTaskResponse {
    pub id: Uuid,
    pub status: BatchStatus,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
    pub created_ids: Vec<Uuid>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<BatchTask> for BatchTaskResponse {
    fn from(t: BatchTask) -> Self {
        Self {
            id: t.id,
            status: t.status,
            total: t.total,
            processed: t.processed,
            succeeded: t.succeeded,
            failed: t.failed,
            created_ids: t.created_ids,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

// ── POST /api/resources/batch ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartBatchRequest {
    pub items: Vec<ResourceInput>,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, items = body.items.len()))]
pub async fn start_batch(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<StartBatchRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = StartBatchUseCase {
        store: state.batch_store(),
        resources: state.resource_repo(),
        categories: state.category_repo(),
    };
    let task = uc.execute(identity.user_id, body.items).await?;
    Ok(ApiResponse(BatchTaskResponse::from(task)))
}

// ── GET /api/resources/batch ─────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_batches(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListBatchesUseCase {
        store: state.batch_store(),
    };
    let tasks = uc.execute(identity.user_id).await?;
    Ok(ApiResponse(
        tasks
            .into_iter()
            .map(BatchTaskResponse::from)
            .collect::<Vec<_>>(),
    ))
}

// ── GET /api/resources/batch/{taskId} ────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, task_id = %task_id))]
pub async fn get_batch(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(task_id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetBatchUseCase {
        store: state.batch_store(),
    };
    let task = uc.execute(identity.user_id, task_id).await?;
    Ok(ApiResponse(BatchTaskResponse::from(task)))
}

// ── POST /api/resources/batch/{taskId}/resume ────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, task_id = %task_id))]
pub async fn resume_batch(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(task_id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ResumeBatchUseCase {
        store: state.batch_store(),
        resources: state.resource_repo(),
        categories: state.category_repo(),
    };
    let task = uc.execute(identity.user_id, task_id).await?;
    Ok(ApiResponse(BatchTaskResponse::from(task)))
}
