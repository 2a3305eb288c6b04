use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use hub_auth_types::identity::AdminIdentity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};

use crate::domain::types::{Category, CategoryNode};
use crate::error::ApiServiceError;
use crate::handlers::double_option;
use crate::state::AppState;
use crate::usecase::category::{
    CategoryListing, CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase,
    GetCategoryUseCase, ListCategoriesUseCase, UpdateCategoryInput, UpdateCategoryUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            parent_id: c.parent_id,
            sort_order: c.sort_order,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CategoryNodeResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub children: Vec<CategoryNodeResponse>,
}

impl From<CategoryNode> for CategoryNodeResponse {
    fn from(node: CategoryNode) -> Self {
        Self {
            category: node.category.into(),
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CategoryListResponse {
    Flat(Vec<CategoryResponse>),
    Tree(Vec<CategoryNodeResponse>),
}

// ── GET /api/categories ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CategoryListQuery {
    #[serde(default)]
    pub tree: bool,
}

#[tracing::instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<CategoryListQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let body = match uc.execute(query.tree).await? {
        CategoryListing::Flat(list) => {
            CategoryListResponse::Flat(list.into_iter().map(Into::into).collect())
        }
        CategoryListing::Tree(nodes) => {
            CategoryListResponse::Tree(nodes.into_iter().map(Into::into).collect())
        }
    };
    Ok(ApiResponse(body))
}

// ── GET /api/categories/{id} ─────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn get_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = uc.execute(id).await?;
    Ok(ApiResponse(CategoryResponse::from(category)))
}

// ── POST /api/categories ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: Option<i32>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidJson(body): ValidJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = uc
        .execute(CreateCategoryInput {
            name: body.name,
            description: body.description,
            parent_id: body.parent_id,
            sort_order: body.sort_order,
        })
        .await?;
    Ok(ApiResponse(CategoryResponse::from(category)))
}

// ── PUT /api/categories/{id} ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `null` moves the category to the top level.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    pub sort_order: Option<i32>,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, category_id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = UpdateCategoryUseCase {
        repo: state.category_repo(),
    };
    let input = UpdateCategoryInput {
        name: body.name,
        description: body.description,
        parent_id: body.parent_id.flatten(),
        clear_parent: matches!(body.parent_id, Some(None)),
        sort_order: body.sort_order,
    };
    let category = uc.execute(id, input).await?;
    Ok(ApiResponse(CategoryResponse::from(category)))
}

// ── DELETE /api/categories/{id} ──────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, category_id = %id))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = DeleteCategoryUseCase {
        repo: state.category_repo(),
    };
    uc.execute(id).await?;
    Ok(ApiResponse(json!({ "deleted": true })))
}
