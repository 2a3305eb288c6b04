use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use hub_auth_types::identity::{Identity, MaybeIdentity};
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};
use hub_domain::pagination::PageRequest;
use hub_domain::resource::{ResourceSort, ResourceStatus};

use crate::domain::types::{Resource, ResourceFilter, ResourceInput};
use crate::error::ApiServiceError;
use crate::state::AppState;
use crate::usecase::resource::{
    CheckLinkUseCase, CreateResourceUseCase, DeleteResourceUseCase, GetResourceUseCase,
    ListMyResourcesUseCase, ListResourcesUseCase, UpdateResourceInput, UpdateResourceUseCase,
    VisitResourceUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    /// Omitted while the caller has not unlocked a paid resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub locked: bool,
    pub price_credits: i64,
    pub status: ResourceStatus,
    pub reject_reason: Option<String>,
    pub is_top: bool,
    pub view_count: i64,
    pub visit_count: i64,
    pub favorite_count: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub ai_summary: Option<String>,
    pub ai_score: Option<i32>,
    pub tags: Vec<String>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ResourceResponse {
    pub fn new(resource: Resource, link_visible: bool) -> Self {
        Self {
            id: resource.id,
            owner_id: resource.owner_id,
            category_id: resource.category_id,
            title: resource.title,
            description: resource.description,
            link: link_visible.then_some(resource.link),
            locked: !link_visible,
            price_credits: resource.price_credits,
            status: resource.status,
            reject_reason: resource.reject_reason,
            is_top: resource.is_top,
            view_count: resource.view_count,
            visit_count: resource.visit_count,
            favorite_count: resource.favorite_count,
            rating_avg: resource.rating_avg,
            rating_count: resource.rating_count,
            ai_summary: resource.ai_summary,
            ai_score: resource.ai_score,
            tags: resource.tags,
            created_at: resource.created_at,
            updated_at: resource.updated_at,
        }
    }

    /// Public listings show links of free resources only.
    pub fn listed(resource: Resource) -> Self {
        let free = resource.is_free();
        Self::new(resource, free)
    }

    /// Owner and admin views always carry the link.
    pub fn managed(resource: Resource) -> Self {
        Self::new(resource, true)
    }
}

// ── GET /api/resources ───────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListQuery {
    pub category: Option<Uuid>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub sort: Option<ResourceSort>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[tracing::instrument(skip_all)]
pub async fn list_resources(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ResourceListQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let page = PageRequest::from_query(query.page, query.page_size, query.limit, query.offset);
    let filter = ResourceFilter {
        category_id: query.category,
        tag: query.tag,
        search: query.search,
        sort: query.sort.unwrap_or_default(),
    };
    let uc = ListResourcesUseCase {
        repo: state.resource_repo(),
    };
    let resources = uc.execute(filter, page).await?;
    Ok(ApiResponse(resources.map(ResourceResponse::listed)))
}

// ── GET /api/resources/{id} ──────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(resource_id = %id))]
pub async fn get_resource(
    State(state): State<AppState>,
    identity: MaybeIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetResourceUseCase {
        repo: state.resource_repo(),
    };
    let view = uc.execute(id, identity.actor()).await?;
    Ok(ApiResponse(ResourceResponse::new(
        view.resource,
        view.link_visible,
    )))
}

// ── POST /api/resources ──────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create_resource(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<ResourceInput>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateResourceUseCase {
        resources: state.resource_repo(),
        categories: state.category_repo(),
    };
    let resource = uc.execute(identity.user_id, body).await?;
    Ok(ApiResponse(ResourceResponse::managed(resource)))
}

// ── PUT /api/resources/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub price_credits: Option<i64>,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %id))]
pub async fn update_resource(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<UpdateResourceRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = UpdateResourceUseCase {
        resources: state.resource_repo(),
        categories: state.category_repo(),
    };
    let input = UpdateResourceInput {
        title: body.title,
        description: body.description,
        link: body.link,
        category_id: body.category_id,
        tags: body.tags,
        price_credits: body.price_credits,
    };
    let resource = uc.execute(identity.actor(), id, input).await?;
    Ok(ApiResponse(ResourceResponse::managed(resource)))
}

// ── DELETE /api/resources/{id} ───────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %id))]
pub async fn delete_resource(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = DeleteResourceUseCase {
        repo: state.resource_repo(),
    };
    uc.execute(identity.actor(), id).await?;
    Ok(ApiResponse(json!({ "deleted": true })))
}

// ── POST /api/resources/{id}/visit ───────────────────────────────────────────

#[derive(Serialize)]
pub struct VisitResponse {
    pub link: String,
}

#[tracing::instrument(skip_all, fields(resource_id = %id))]
pub async fn visit_resource(
    State(state): State<AppState>,
    identity: MaybeIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = VisitResourceUseCase {
        repo: state.resource_repo(),
    };
    let link = uc.execute(id, identity.actor()).await?;
    Ok(ApiResponse(VisitResponse { link }))
}

// ── POST /api/resources/check-link ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckLinkRequest {
    pub url: String,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn check_link(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<CheckLinkRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CheckLinkUseCase {
        checker: state.link_checker(),
    };
    let result = uc.execute(&body.url).await?;
    Ok(ApiResponse(result))
}

// ── GET /api/users/me/resources ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page, self.page_size, self.limit, self.offset)
    }
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_my_resources(
    State(state): State<AppState>,
    identity: Identity,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListMyResourcesUseCase {
        repo: state.resource_repo(),
    };
    let resources = uc.execute(identity.user_id, query.page_request()).await?;
    Ok(ApiResponse(resources.map(ResourceResponse::managed)))
}
