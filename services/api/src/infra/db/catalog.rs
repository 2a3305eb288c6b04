use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use hub_api_schema::{categories, resources, tags};
use hub_core::retry::RetryPolicy;
use hub_core::sea_ext::is_unique_violation;
use hub_domain::pagination::{PageRequest, Paginated};

use super::{like_pattern, read};
use crate::domain::repository::{CategoryRepository, TagRepository};
use crate::domain::types::{Category, Tag};
use crate::error::{ApiServiceError, DbContext};

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ApiServiceError> {
        let models = read(&self.retry, "list categories", || {
            categories::Entity::find()
                .order_by_asc(categories::Column::SortOrder)
                .order_by_asc(categories::Column::Name)
                .all(&self.db)
        })
        .await?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>, ApiServiceError> {
        let model = read(&self.retry, "find category", || {
            categories::Entity::find_by_id(id).one(&self.db)
        })
        .await?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), ApiServiceError> {
        let result = categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            parent_id: Set(category.parent_id),
            sort_order: Set(category.sort_order),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ApiServiceError::Duplicate("category")),
            Err(e) => Err::<(), _>(e).db_context("create category"),
        }
    }

    async fn update(&self, category: &Category) -> Result<(), ApiServiceError> {
        let result = categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            parent_id: Set(category.parent_id),
            sort_order: Set(category.sort_order),
            created_at: Default::default(),
            updated_at: Set(category.updated_at),
        }
        .update(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sea_orm::DbErr::RecordNotUpdated) => Err(ApiServiceError::CategoryNotFound),
            Err(e) if is_unique_violation(&e) => Err(ApiServiceError::Duplicate("category")),
            Err(e) => Err::<(), _>(e).db_context("update category"),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .db_context("delete category")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_children(&self, id: Uuid) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count child categories", || {
            categories::Entity::find()
                .filter(categories::Column::ParentId.eq(id))
                .count(&self.db)
        })
        .await
    }

    async fn count_resources(&self, id: Uuid) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count category resources", || {
            resources::Entity::find()
                .filter(resources::Column::CategoryId.eq(id))
                .count(&self.db)
        })
        .await
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        parent_id: model.parent_id,
        sort_order: model.sort_order,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl TagRepository for DbTagRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Tag>, ApiServiceError> {
        let mut query = tags::Entity::find();
        if let Some(term) = search {
            query = query.filter(tags::Column::Name.like(like_pattern(term)));
        }
        let (total, models) = tokio::try_join!(
            read(&self.retry, "count tags", || query.clone().count(&self.db)),
            read(&self.retry, "list tags", || {
                query
                    .clone()
                    .order_by_desc(tags::Column::UsageCount)
                    .order_by_asc(tags::Column::Name)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;
        Ok(Paginated::new(
            models.into_iter().map(tag_from_model).collect(),
            total,
            page,
        ))
    }

    async fn create(&self, name: &str) -> Result<Tag, ApiServiceError> {
        let result = tags::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_owned()),
            usage_count: Set(0),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(tag_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(ApiServiceError::Duplicate("tag")),
            Err(e) => Err::<Tag, _>(e).db_context("create tag"),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        // resource_tags rows go with it (ON DELETE CASCADE).
        let result = tags::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .db_context("delete tag")?;
        Ok(result.rows_affected > 0)
    }
}

pub(crate) fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        usage_count: model.usage_count,
        created_at: model.created_at,
    }
}
