use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use hub_api_schema::{credit_transactions, orders, resource_unlocks, users};
use hub_core::retry::RetryPolicy;
use hub_domain::credit::CreditTxKind;
use hub_domain::order::OrderStatus;
use hub_domain::pagination::{PageRequest, Paginated};

use super::read;
use crate::domain::repository::{CreditRepository, OrderRepository};
use crate::domain::types::{CreditTransaction, Order, PaymentOutcome, Resource, UnlockOutcome};
use crate::error::{ApiServiceError, DbContext};

// ── Credit repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCreditRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl CreditRepository for DbCreditRepository {
    async fn balance(&self, user_id: Uuid) -> Result<Option<i64>, ApiServiceError> {
        let user = read(&self.retry, "find balance", || {
            users::Entity::find_by_id(user_id).one(&self.db)
        })
        .await?;
        Ok(user.map(|u| u.credits))
    }

    async fn transactions(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<CreditTransaction>, ApiServiceError> {
        let query = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id));
        let (total, models) = tokio::try_join!(
            read(&self.retry, "count credit transactions", || {
                query.clone().count(&self.db)
            }),
            read(&self.retry, "list credit transactions", || {
                query
                    .clone()
                    .order_by_desc(credit_transactions::Column::CreatedAt)
                    .order_by_desc(credit_transactions::Column::Id)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;
        let items = models
            .into_iter()
            .map(transaction_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, total, page))
    }

    async fn unlock(
        &self,
        buyer_id: Uuid,
        resource: &Resource,
    ) -> Result<UnlockOutcome, ApiServiceError> {
        let price = resource.price_credits;
        let txn = self.db.begin().await.db_context("begin unlock")?;

        let inserted = resource_unlocks::Entity::insert(resource_unlocks::ActiveModel {
            user_id: Set(buyer_id),
            resource_id: Set(resource.id),
            price_credits: Set(price),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                resource_unlocks::Column::UserId,
                resource_unlocks::Column::ResourceId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .db_context("insert unlock")?;
        if inserted == 0 {
            let balance = current_balance(&txn, buyer_id)
                .await
                .db_context("read buyer balance")?;
            return Ok(UnlockOutcome::AlreadyUnlocked { balance });
        }

        let charged = users::Entity::update_many()
            .col_expr(users::Column::Credits, Expr::col(users::Column::Credits).sub(price))
            .filter(users::Column::Id.eq(buyer_id))
            .filter(users::Column::Credits.gte(price))
            .exec(&txn)
            .await
            .db_context("charge buyer")?;
        if charged.rows_affected == 0 {
            // Dropping the transaction rolls back the unlock row.
            return Ok(UnlockOutcome::Insufficient);
        }
        let balance = current_balance(&txn, buyer_id)
            .await
            .db_context("read buyer balance")?;
        record(
            &txn,
            buyer_id,
            -price,
            balance,
            CreditTxKind::Unlock,
            Some(resource.id),
            None,
        )
        .await
        .db_context("record unlock")?;

        users::Entity::update_many()
            .col_expr(users::Column::Credits, Expr::col(users::Column::Credits).add(price))
            .filter(users::Column::Id.eq(resource.owner_id))
            .exec(&txn)
            .await
            .db_context("pay owner")?;
        let owner_balance = current_balance(&txn, resource.owner_id)
            .await
            .db_context("read owner balance")?;
        record(
            &txn,
            resource.owner_id,
            price,
            owner_balance,
            CreditTxKind::Sale,
            Some(resource.id),
            None,
        )
        .await
        .db_context("record sale")?;

        txn.commit().await.db_context("commit unlock")?;
        Ok(UnlockOutcome::Unlocked { balance })
    }

    async fn adjust(
        &self,
        user_id: Uuid,
        amount: i64,
        note: &str,
    ) -> Result<Option<i64>, ApiServiceError> {
        let debit = match amount {
            a if a < 0 => Some(a.checked_neg().ok_or_else(|| {
                ApiServiceError::invalid("amount is out of range")
            })?),
            _ => None,
        };
        let txn = self.db.begin().await.db_context("begin adjust credits")?;
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::Credits, Expr::col(users::Column::Credits).add(amount))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id));
        if let Some(debit) = debit {
            update = update.filter(users::Column::Credits.gte(debit));
        }
        let result = update.exec(&txn).await.db_context("adjust credits")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        let balance = current_balance(&txn, user_id)
            .await
            .db_context("read adjusted balance")?;
        record(
            &txn,
            user_id,
            amount,
            balance,
            CreditTxKind::AdminAdjust,
            None,
            Some(note),
        )
        .await
        .db_context("record adjustment")?;
        txn.commit().await.db_context("commit adjust credits")?;
        Ok(Some(balance))
    }
}

async fn current_balance<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<i64, DbErr> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|u| u.credits)
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {user_id}")))
}

/// Append one ledger row.
async fn record(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    amount: i64,
    balance_after: i64,
    kind: CreditTxKind,
    reference_id: Option<Uuid>,
    note: Option<&str>,
) -> Result<(), DbErr> {
    credit_transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        amount: Set(amount),
        balance_after: Set(balance_after),
        kind: Set(kind.as_str().to_owned()),
        reference_id: Set(reference_id),
        note: Set(note.map(str::to_owned)),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn transaction_from_model(
    model: credit_transactions::Model,
) -> Result<CreditTransaction, ApiServiceError> {
    let kind = model.kind.parse::<CreditTxKind>().map_err(|()| {
        ApiServiceError::Internal(anyhow::anyhow!(
            "unknown credit transaction kind {:?} on {}",
            model.kind,
            model.id
        ))
    })?;
    Ok(CreditTransaction {
        id: model.id,
        user_id: model.user_id,
        amount: model.amount,
        balance_after: model.balance_after,
        kind,
        reference_id: model.reference_id,
        note: model.note,
        created_at: model.created_at,
    })
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl OrderRepository for DbOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), ApiServiceError> {
        orders::ActiveModel {
            id: Set(order.id),
            user_id: Set(order.user_id),
            package_id: Set(order.package_id.clone()),
            credits: Set(order.credits),
            amount_cents: Set(order.amount_cents),
            status: Set(order.status.as_str().to_owned()),
            trade_no: Set(order.trade_no.clone()),
            paid_at: Set(order.paid_at),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        }
        .insert(&self.db)
        .await
        .db_context("create order")?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, ApiServiceError> {
        let model = read(&self.retry, "find order", || {
            orders::Entity::find_by_id(id).one(&self.db)
        })
        .await?;
        model.map(order_from_model).transpose()
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Order>, ApiServiceError> {
        let query = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        let (total, models) = tokio::try_join!(
            read(&self.retry, "count orders", || query.clone().count(&self.db)),
            read(&self.retry, "list orders", || {
                query
                    .clone()
                    .order_by_desc(orders::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;
        let items = models
            .into_iter()
            .map(order_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, total, page))
    }

    async fn settle_paid(
        &self,
        order: &Order,
        trade_no: &str,
    ) -> Result<PaymentOutcome, ApiServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await.db_context("begin settle order")?;
        let moved = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Paid.as_str()))
            .col_expr(orders::Column::TradeNo, Expr::value(trade_no))
            .col_expr(orders::Column::PaidAt, Expr::value(now))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .exec(&txn)
            .await
            .db_context("mark order paid")?;

        if moved.rows_affected == 0 {
            drop(txn);
            let current = self.find(order.id).await?.ok_or(ApiServiceError::OrderNotFound)?;
            return Ok(match current.status {
                OrderStatus::Paid => PaymentOutcome::AlreadyPaid,
                other => PaymentOutcome::NotPending(other),
            });
        }

        users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(order.credits),
            )
            .filter(users::Column::Id.eq(order.user_id))
            .exec(&txn)
            .await
            .db_context("credit purchase")?;
        let balance = current_balance(&txn, order.user_id)
            .await
            .db_context("read purchaser balance")?;
        record(
            &txn,
            order.user_id,
            order.credits,
            balance,
            CreditTxKind::Purchase,
            Some(order.id),
            None,
        )
        .await
        .db_context("record purchase")?;
        txn.commit().await.db_context("commit settle order")?;

        tracing::info!(order_id = %order.id, credits = order.credits, "order settled");
        Ok(PaymentOutcome::Credited { balance })
    }

    async fn mark_failed(&self, id: Uuid, trade_no: &str) -> Result<bool, ApiServiceError> {
        let now = Utc::now();
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Failed.as_str()))
            .col_expr(orders::Column::TradeNo, Expr::value(trade_no))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .db_context("mark order failed")?;
        Ok(result.rows_affected == 1)
    }
}

fn order_from_model(model: orders::Model) -> Result<Order, ApiServiceError> {
    let status = model.status.parse::<OrderStatus>().map_err(|()| {
        ApiServiceError::Internal(anyhow::anyhow!(
            "unknown order status {:?} on {}",
            model.status,
            model.id
        ))
    })?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        package_id: model.package_id,
        credits: model.credits,
        amount_cents: model.amount_cents,
        status,
        trade_no: model.trade_no,
        paid_at: model.paid_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
