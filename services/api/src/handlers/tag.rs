use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use hub_auth_types::identity::AdminIdentity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};
use hub_domain::pagination::PageRequest;

use crate::domain::types::Tag;
use crate::error::ApiServiceError;
use crate::state::AppState;
use crate::usecase::tag::{CreateTagUseCase, DeleteTagUseCase, ListTagsUseCase};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub usage_count: i64,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            usage_count: t.usage_count,
            created_at: t.created_at,
        }
    }
}

// ── GET /api/tags ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TagListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[tracing::instrument(skip_all)]
pub async fn list_tags(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TagListQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let page = PageRequest::from_query(query.page, query.page_size, query.limit, query.offset);
    let uc = ListTagsUseCase {
        repo: state.tag_repo(),
    };
    let tags = uc.execute(query.search.as_deref(), page).await?;
    Ok(ApiResponse(tags.map(TagResponse::from)))
}

// ── POST /api/tags ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn create_tag(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidJson(body): ValidJson<CreateTagRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateTagUseCase {
        repo: state.tag_repo(),
    };
    let tag = uc.execute(&body.name).await?;
    Ok(ApiResponse(TagResponse::from(tag)))
}

// ── DELETE /api/tags/{id} ────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, tag_id = %id))]
pub async fn delete_tag(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = DeleteTagUseCase {
        repo: state.tag_repo(),
    };
    uc.execute(id).await?;
    Ok(ApiResponse(json!({ "deleted": true })))
}
