use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use hub_api_schema::{favorites, orders, ratings, resources, users};
use hub_core::retry::RetryPolicy;
use hub_domain::order::OrderStatus;
use hub_domain::resource::ResourceStatus;

use super::read;
use crate::domain::repository::StatsRepository;
use crate::error::ApiServiceError;

#[derive(Clone)]
pub struct DbStatsRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl StatsRepository for DbStatsRepository {
    async fn count_users(&self) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count users", || {
            users::Entity::find().count(&self.db)
        })
        .await
    }

    async fn count_resources(&self, status: ResourceStatus) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count resources", || {
            resources::Entity::find()
                .filter(resources::Column::Status.eq(status.as_str()))
                .count(&self.db)
        })
        .await
    }

    async fn count_favorites(&self) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count favorites", || {
            favorites::Entity::find().count(&self.db)
        })
        .await
    }

    async fn count_ratings(&self) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count ratings", || {
            ratings::Entity::find().count(&self.db)
        })
        .await
    }

    async fn count_paid_orders(&self) -> Result<u64, ApiServiceError> {
        read(&self.retry, "count paid orders", || {
            orders::Entity::find()
                .filter(orders::Column::Status.eq(OrderStatus::Paid.as_str()))
                .count(&self.db)
        })
        .await
    }

    async fn revenue_cents(&self) -> Result<i64, ApiServiceError> {
        let sum = read(&self.retry, "sum revenue", || {
            orders::Entity::find()
                .select_only()
                .column_as(Expr::cust("COALESCE(SUM(amount_cents), 0)::bigint"), "revenue")
                .filter(orders::Column::Status.eq(OrderStatus::Paid.as_str()))
                .into_tuple::<i64>()
                .one(&self.db)
        })
        .await?;
        Ok(sum.unwrap_or(0))
    }

    async fn credits_in_circulation(&self) -> Result<i64, ApiServiceError> {
        let sum = read(&self.retry, "sum credits", || {
            users::Entity::find()
                .select_only()
                .column_as(Expr::cust("COALESCE(SUM(credits), 0)::bigint"), "credits")
                .into_tuple::<i64>()
                .one(&self.db)
        })
        .await?;
        Ok(sum.unwrap_or(0))
    }
}
