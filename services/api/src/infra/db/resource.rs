use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr, OnConflict, Query, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait,
};
use uuid::Uuid;

use hub_api_schema::{resource_tags, resource_unlocks, resources, tags};
use hub_core::retry::RetryPolicy;
use hub_core::sea_ext::OrderByRandom;
use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::resource::{ResourceSort, ResourceStatus};

use super::{like_pattern, read};
use crate::domain::repository::ResourceRepository;
use crate::domain::types::{Resource, ResourceChanges, ResourceFilter, ResourceInput};
use crate::error::{ApiServiceError, DbContext};

#[derive(Clone)]
pub struct DbResourceRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl DbResourceRepository {
    /// Count and fetch one page concurrently, then attach tags.
    async fn paginate(
        &self,
        query: Select<resources::Entity>,
        sort: ResourceSort,
        page: PageRequest,
        op: &'static str,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let (total, models) = tokio::try_join!(
            read(&self.retry, op, || query.clone().count(&self.db)),
            read(&self.retry, op, || {
                apply_sort(query.clone(), sort)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;
        let items = self.with_tags(models).await?;
        Ok(Paginated::new(items, total, page))
    }

    async fn with_tags(&self, models: Vec<resources::Model>) -> Result<Vec<Resource>, ApiServiceError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut tags_by_resource = read(&self.retry, "load resource tags", || {
            load_tags(&self.db, &ids)
        })
        .await?;
        models
            .into_iter()
            .map(|m| {
                let tags = tags_by_resource.remove(&m.id).unwrap_or_default();
                resource_from_model(m, tags)
            })
            .collect()
    }
}

impl ResourceRepository for DbResourceRepository {
    async fn list_public(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let mut query = resources::Entity::find()
            .filter(resources::Column::Status.eq(ResourceStatus::Approved.as_str()));
        if let Some(category_id) = filter.category_id {
            query = query.filter(resources::Column::CategoryId.eq(category_id));
        }
        if let Some(tag) = filter.tag.as_deref() {
            query = query.filter(
                resources::Column::Id.in_subquery(
                    Query::select()
                        .column((resource_tags::Entity, resource_tags::Column::ResourceId))
                        .from(resource_tags::Entity)
                        .inner_join(
                            tags::Entity,
                            Expr::col((tags::Entity, tags::Column::Id))
                                .equals((resource_tags::Entity, resource_tags::Column::TagId)),
                        )
                        .and_where(Expr::col((tags::Entity, tags::Column::Name)).eq(tag))
                        .to_owned(),
                ),
            );
        }
        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(resources::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(resources::Column::Description).ilike(pattern)),
            );
        }
        self.paginate(query, filter.sort, page, "list public resources")
            .await
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let query = resources::Entity::find().filter(resources::Column::OwnerId.eq(owner_id));
        self.paginate(query, ResourceSort::Latest, page, "list owner resources")
            .await
    }

    async fn list_by_status(
        &self,
        status: Option<ResourceStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let mut query = resources::Entity::find();
        if let Some(status) = status {
            query = query.filter(resources::Column::Status.eq(status.as_str()));
        }
        self.paginate(query, ResourceSort::Latest, page, "list resources by status")
            .await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resource>, ApiServiceError> {
        let model = read(&self.retry, "find resource", || {
            resources::Entity::find_by_id(id).one(&self.db)
        })
        .await?;
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        owner_id: Uuid,
        input: &ResourceInput,
    ) -> Result<Resource, ApiServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await.db_context("begin create resource")?;

        let model = resources::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            category_id: Set(input.category_id),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            link: Set(input.link.clone()),
            price_credits: Set(input.price_credits),
            status: Set(ResourceStatus::Pending.as_str().to_owned()),
            reject_reason: Set(None),
            is_top: Set(false),
            view_count: Set(0),
            visit_count: Set(0),
            favorite_count: Set(0),
            rating_avg: Set(0.0),
            rating_count: Set(0),
            ai_summary: Set(None),
            ai_score: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .db_context("insert resource")?;

        attach_tags(&txn, model.id, &input.tags)
            .await
            .db_context("attach resource tags")?;
        txn.commit().await.db_context("commit create resource")?;

        resource_from_model(model, input.tags.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ResourceChanges,
    ) -> Result<Option<Resource>, ApiServiceError> {
        let txn = self.db.begin().await.db_context("begin update resource")?;
        let Some(model) = resources::Entity::find_by_id(id)
            .one(&txn)
            .await
            .db_context("find resource for update")?
        else {
            return Ok(None);
        };

        let mut am = model.into_active_model();
        if let Some(title) = &changes.title {
            am.title = Set(title.clone());
        }
        if let Some(description) = &changes.description {
            am.description = Set(description.clone());
        }
        if let Some(link) = &changes.link {
            am.link = Set(link.clone());
        }
        if let Some(category_id) = changes.category_id {
            am.category_id = Set(Some(category_id));
        }
        if let Some(price) = changes.price_credits {
            am.price_credits = Set(price);
        }
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
            am.reject_reason = Set(None);
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await.db_context("update resource")?;

        if let Some(next_tags) = &changes.tags {
            let current = load_tags(&txn, &[id])
                .await
                .db_context("load tags for update")?
                .remove(&id)
                .unwrap_or_default();
            let removed: Vec<String> = current
                .iter()
                .filter(|t| !next_tags.contains(t))
                .cloned()
                .collect();
            let added: Vec<String> = next_tags
                .iter()
                .filter(|t| !current.contains(t))
                .cloned()
                .collect();
            detach_tags(&txn, id, &removed)
                .await
                .db_context("detach resource tags")?;
            attach_tags(&txn, id, &added)
                .await
                .db_context("attach resource tags")?;
        }
        txn.commit().await.db_context("commit update resource")?;

        self.find(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let txn = self.db.begin().await.db_context("begin delete resource")?;
        let current = load_tags(&txn, &[id])
            .await
            .db_context("load tags for delete")?
            .remove(&id)
            .unwrap_or_default();
        detach_tags(&txn, id, &current)
            .await
            .db_context("detach resource tags")?;
        let result = resources::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .db_context("delete resource")?;
        txn.commit().await.db_context("commit delete resource")?;
        Ok(result.rows_affected > 0)
    }

    async fn increment_view(&self, id: Uuid) -> Result<(), ApiServiceError> {
        resources::Entity::update_many()
            .col_expr(
                resources::Column::ViewCount,
                Expr::col(resources::Column::ViewCount).add(1),
            )
            .filter(resources::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .db_context("increment view count")?;
        Ok(())
    }

    async fn increment_visit(&self, id: Uuid) -> Result<(), ApiServiceError> {
        resources::Entity::update_many()
            .col_expr(
                resources::Column::VisitCount,
                Expr::col(resources::Column::VisitCount).add(1),
            )
            .filter(resources::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .db_context("increment visit count")?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: ResourceStatus,
        to: ResourceStatus,
        reject_reason: Option<&str>,
    ) -> Result<bool, ApiServiceError> {
        let result = resources::Entity::update_many()
            .col_expr(resources::Column::Status, Expr::value(to.as_str()))
            .col_expr(
                resources::Column::RejectReason,
                Expr::value(reject_reason.map(str::to_owned)),
            )
            .col_expr(resources::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(resources::Column::Id.eq(id))
            .filter(resources::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .db_context("set resource status")?;
        Ok(result.rows_affected == 1)
    }

    async fn set_top_if(
        &self,
        id: Uuid,
        expected: bool,
        new: bool,
    ) -> Result<bool, ApiServiceError> {
        let result = resources::Entity::update_many()
            .col_expr(resources::Column::IsTop, Expr::value(new))
            .filter(resources::Column::Id.eq(id))
            .filter(resources::Column::IsTop.eq(expected))
            .exec(&self.db)
            .await
            .db_context("toggle resource top")?;
        Ok(result.rows_affected == 1)
    }

    async fn set_enrichment(
        &self,
        id: Uuid,
        summary: &str,
        score: i32,
    ) -> Result<(), ApiServiceError> {
        let result = resources::Entity::update_many()
            .col_expr(resources::Column::AiSummary, Expr::value(summary))
            .col_expr(resources::Column::AiScore, Expr::value(score))
            .filter(resources::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .db_context("store enrichment")?;
        if result.rows_affected == 0 {
            return Err(ApiServiceError::ResourceNotFound);
        }
        Ok(())
    }

    async fn has_unlocked(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<bool, ApiServiceError> {
        let unlock = read(&self.retry, "find unlock", || {
            resource_unlocks::Entity::find_by_id((user_id, resource_id)).one(&self.db)
        })
        .await?;
        Ok(unlock.is_some())
    }
}

/// Pinned first, then the requested order.
fn apply_sort(query: Select<resources::Entity>, sort: ResourceSort) -> Select<resources::Entity> {
    let query = query.order_by_desc(resources::Column::IsTop);
    match sort {
        ResourceSort::Latest => query.order_by_desc(resources::Column::CreatedAt),
        ResourceSort::Popular => query
            .order_by_desc(resources::Column::FavoriteCount)
            .order_by_desc(resources::Column::ViewCount)
            .order_by_desc(resources::Column::CreatedAt),
        ResourceSort::Rating => query
            .order_by_desc(resources::Column::RatingAvg)
            .order_by_desc(resources::Column::RatingCount)
            .order_by_desc(resources::Column::CreatedAt),
        ResourceSort::Random => query.order_by_random(),
    }
}

pub(crate) async fn load_tags<C: ConnectionTrait>(
    db: &C,
    resource_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<String>>, DbErr> {
    let mut by_resource: HashMap<Uuid, Vec<String>> = HashMap::new();
    if resource_ids.is_empty() {
        return Ok(by_resource);
    }
    let rows = resource_tags::Entity::find()
        .filter(resource_tags::Column::ResourceId.is_in(resource_ids.iter().copied()))
        .find_also_related(tags::Entity)
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await?;
    for (link, tag) in rows {
        if let Some(tag) = tag {
            by_resource.entry(link.resource_id).or_default().push(tag.name);
        }
    }
    Ok(by_resource)
}

/// Upsert tags by name, bump their usage and link them to the resource.
async fn attach_tags<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    if names.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    tags::Entity::insert_many(names.iter().map(|name| tags::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.clone()),
        usage_count: Set(1),
        created_at: Set(now),
    }))
    .on_conflict(
        OnConflict::column(tags::Column::Name)
            .value(
                tags::Column::UsageCount,
                Expr::col((tags::Entity, tags::Column::UsageCount)).add(1),
            )
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    let tag_ids: Vec<Uuid> = tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    resource_tags::Entity::insert_many(tag_ids.into_iter().map(|tag_id| {
        resource_tags::ActiveModel {
            resource_id: Set(resource_id),
            tag_id: Set(tag_id),
        }
    }))
    .on_conflict(
        OnConflict::columns([resource_tags::Column::ResourceId, resource_tags::Column::TagId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Unlink tags from the resource and decrement their usage.
async fn detach_tags<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    if names.is_empty() {
        return Ok(());
    }
    let tag_ids: Vec<Uuid> = tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    resource_tags::Entity::delete_many()
        .filter(resource_tags::Column::ResourceId.eq(resource_id))
        .filter(resource_tags::Column::TagId.is_in(tag_ids.iter().copied()))
        .exec(db)
        .await?;
    tags::Entity::update_many()
        .col_expr(
            tags::Column::UsageCount,
            Expr::col(tags::Column::UsageCount).sub(1),
        )
        .filter(tags::Column::Id.is_in(tag_ids))
        .filter(tags::Column::UsageCount.gt(0))
        .exec(db)
        .await?;
    Ok(())
}

pub(crate) fn resource_from_model(
    model: resources::Model,
    tags: Vec<String>,
) -> Result<Resource, ApiServiceError> {
    let status = model.status.parse::<ResourceStatus>().map_err(|()| {
        ApiServiceError::Internal(anyhow::anyhow!(
            "unknown resource status {:?} on {}",
            model.status,
            model.id
        ))
    })?;
    Ok(Resource {
        id: model.id,
        owner_id: model.owner_id,
        category_id: model.category_id,
        title: model.title,
        description: model.description,
        link: model.link,
        price_credits: model.price_credits,
        status,
        reject_reason: model.reject_reason,
        is_top: model.is_top,
        view_count: model.view_count,
        visit_count: model.visit_count,
        favorite_count: model.favorite_count,
        rating_avg: model.rating_avg,
        rating_count: model.rating_count,
        ai_summary: model.ai_summary,
        ai_score: model.ai_score,
        tags,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
