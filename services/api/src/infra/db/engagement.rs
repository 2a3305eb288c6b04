use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use hub_api_schema::{favorites, ratings, resources};
use hub_core::retry::RetryPolicy;
use hub_domain::pagination::{PageRequest, Paginated};

use super::read;
use super::resource::{load_tags, resource_from_model};
use crate::domain::repository::{FavoriteRepository, RatingRepository};
use crate::domain::types::{FavoriteEntry, RatingSummary};
use crate::error::{ApiServiceError, DbContext};

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn add(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let txn = self.db.begin().await.db_context("begin add favorite")?;
        let inserted = favorites::Entity::insert(favorites::ActiveModel {
            user_id: Set(user_id),
            resource_id: Set(resource_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::ResourceId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .db_context("insert favorite")?;
        if inserted == 0 {
            return Ok(false);
        }
        bump_favorite_count(&txn, resource_id, 1)
            .await
            .db_context("increment favorite count")?;
        txn.commit().await.db_context("commit add favorite")?;
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let txn = self.db.begin().await.db_context("begin remove favorite")?;
        let result = favorites::Entity::delete_by_id((user_id, resource_id))
            .exec(&txn)
            .await
            .db_context("delete favorite")?;
        if result.rows_affected == 0 {
            return Ok(false);
        }
        bump_favorite_count(&txn, resource_id, -1)
            .await
            .db_context("decrement favorite count")?;
        txn.commit().await.db_context("commit remove favorite")?;
        Ok(true)
    }

    async fn exists(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let row = read(&self.retry, "find favorite", || {
            favorites::Entity::find_by_id((user_id, resource_id)).one(&self.db)
        })
        .await?;
        Ok(row.is_some())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<FavoriteEntry>, ApiServiceError> {
        let query = favorites::Entity::find().filter(favorites::Column::UserId.eq(user_id));
        let (total, rows) = tokio::try_join!(
            read(&self.retry, "count favorites", || query.clone().count(&self.db)),
            read(&self.retry, "list favorites", || {
                query
                    .clone()
                    .find_also_related(resources::Entity)
                    .order_by_desc(favorites::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;

        let ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, r)| r.as_ref().map(|r| r.id))
            .collect();
        let mut tags = read(&self.retry, "load favorite tags", || {
            load_tags(&self.db, &ids)
        })
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (favorite, resource) in rows {
            let Some(resource) = resource else { continue };
            let resource_tags = tags.remove(&resource.id).unwrap_or_default();
            items.push(FavoriteEntry {
                resource: resource_from_model(resource, resource_tags)?,
                favorited_at: favorite.created_at,
            });
        }
        Ok(Paginated::new(items, total, page))
    }
}

async fn bump_favorite_count<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
    delta: i64,
) -> Result<(), DbErr> {
    let mut update = resources::Entity::update_many()
        .col_expr(
            resources::Column::FavoriteCount,
            Expr::col(resources::Column::FavoriteCount).add(delta),
        )
        .filter(resources::Column::Id.eq(resource_id));
    if delta < 0 {
        update = update.filter(resources::Column::FavoriteCount.gt(0));
    }
    update.exec(db).await?;
    Ok(())
}

// ── Rating repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl RatingRepository for DbRatingRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
        value: i16,
    ) -> Result<RatingSummary, ApiServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await.db_context("begin rate resource")?;
        ratings::Entity::insert(ratings::ActiveModel {
            user_id: Set(user_id),
            resource_id: Set(resource_id),
            value: Set(value),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::columns([ratings::Column::UserId, ratings::Column::ResourceId])
                .update_columns([ratings::Column::Value, ratings::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .db_context("upsert rating")?;
        let (average, count) = refresh_aggregate(&txn, resource_id)
            .await
            .db_context("refresh rating aggregate")?;
        txn.commit().await.db_context("commit rate resource")?;

        Ok(RatingSummary {
            average,
            count,
            mine: Some(value),
        })
    }

    async fn remove(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let txn = self.db.begin().await.db_context("begin remove rating")?;
        let result = ratings::Entity::delete_by_id((user_id, resource_id))
            .exec(&txn)
            .await
            .db_context("delete rating")?;
        if result.rows_affected == 0 {
            return Ok(false);
        }
        refresh_aggregate(&txn, resource_id)
            .await
            .db_context("refresh rating aggregate")?;
        txn.commit().await.db_context("commit remove rating")?;
        Ok(true)
    }

    async fn summary(
        &self,
        resource_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<RatingSummary, ApiServiceError> {
        let resource = read(&self.retry, "find rated resource", || {
            resources::Entity::find_by_id(resource_id).one(&self.db)
        })
        .await?
        .ok_or(ApiServiceError::ResourceNotFound)?;

        let mine = match user_id {
            Some(user_id) => read(&self.retry, "find own rating", || {
                ratings::Entity::find_by_id((user_id, resource_id)).one(&self.db)
            })
            .await?
            .map(|r| r.value),
            None => None,
        };

        Ok(RatingSummary {
            average: resource.rating_avg,
            count: resource.rating_count,
            mine,
        })
    }
}

/// Recompute the denormalized average and count on the resource row.
async fn refresh_aggregate<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
) -> Result<(f64, i64), DbErr> {
    let (average, count) = ratings::Entity::find()
        .select_only()
        .column_as(Expr::cust("COALESCE(AVG(value), 0)::float8"), "average")
        .column_as(Expr::cust("COUNT(*)"), "count")
        .filter(ratings::Column::ResourceId.eq(resource_id))
        .into_tuple::<(f64, i64)>()
        .one(db)
        .await?
        .unwrap_or((0.0, 0));
    let average = (average * 100.0).round() / 100.0;

    resources::Entity::update_many()
        .col_expr(resources::Column::RatingAvg, Expr::value(average))
        .col_expr(resources::Column::RatingCount, Expr::value(count))
        .filter(resources::Column::Id.eq(resource_id))
        .exec(db)
        .await?;
    Ok((average, count))
}
