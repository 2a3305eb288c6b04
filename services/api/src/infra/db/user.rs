use chrono::Utc;
use sea_orm::sea_query::{Condition, Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use hub_api_schema::{auth_codes, credit_transactions, users};
use hub_core::retry::RetryPolicy;
use hub_core::sea_ext::is_unique_violation;
use hub_domain::credit::CreditTxKind;
use hub_domain::pagination::{PageRequest, Paginated};

use super::{like_pattern, read};
use crate::domain::repository::{AuthCodeRepository, UserRepository};
use crate::domain::types::{AuthCode, User};
use crate::error::{ApiServiceError, DbContext};

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiServiceError> {
        let model = read(&self.retry, "find user by id", || {
            users::Entity::find_by_id(id).one(&self.db)
        })
        .await?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiServiceError> {
        let model = read(&self.retry, "find user by email", || {
            users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&self.db)
        })
        .await?;
        Ok(model.map(user_from_model))
    }

    async fn create(
        &self,
        email: &str,
        name: &str,
        signup_bonus: i64,
    ) -> Result<User, ApiServiceError> {
        let now = Utc::now();
        let user = users::Model {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            name: name.to_owned(),
            avatar_url: None,
            credits: signup_bonus,
            created_at: now,
            updated_at: now,
        };

        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        email: Set(user.email),
                        name: Set(user.name),
                        avatar_url: Set(None),
                        credits: Set(user.credits),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.updated_at),
                    }
                    .insert(txn)
                    .await?;
                    if user.credits > 0 {
                        credit_transactions::ActiveModel {
                            id: Set(Uuid::now_v7()),
                            user_id: Set(user.id),
                            amount: Set(user.credits),
                            balance_after: Set(user.credits),
                            kind: Set(CreditTxKind::SignupBonus.as_str().to_owned()),
                            reference_id: Set(None),
                            note: Set(None),
                            created_at: Set(user.created_at),
                        }
                        .insert(txn)
                        .await?;
                    }
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(user_from_model(user)),
            // Lost a first-login race for the same email: use the winner's row.
            Err(sea_orm::TransactionError::Transaction(ref e)) if is_unique_violation(e) => self
                .find_by_email(email)
                .await?
                .ok_or(ApiServiceError::UserNotFound),
            Err(e) => Err::<User, _>(e).db_context("create user"),
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<User>, ApiServiceError> {
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id));
        if let Some(name) = name {
            update = update.col_expr(users::Column::Name, Expr::value(name));
        }
        if let Some(avatar_url) = avatar_url {
            update = update.col_expr(users::Column::AvatarUrl, Expr::value(avatar_url));
        }
        let result = update.exec(&self.db).await.db_context("update user profile")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn search(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiServiceError> {
        let mut query = users::Entity::find();
        if let Some(term) = search {
            let pattern = like_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(users::Column::Email).ilike(pattern.clone()))
                    .add(Expr::col(users::Column::Name).ilike(pattern)),
            );
        }
        let (total, models) = tokio::try_join!(
            read(&self.retry, "count users", || query.clone().count(&self.db)),
            read(&self.retry, "list users", || {
                query
                    .clone()
                    .order_by_desc(users::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(&self.db)
            }),
        )?;
        Ok(Paginated::new(
            models.into_iter().map(user_from_model).collect(),
            total,
            page,
        ))
    }
}

pub(crate) fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        avatar_url: model.avatar_url,
        credits: model.credits,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── AuthCode repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthCodeRepository {
    pub db: DatabaseConnection,
    pub retry: RetryPolicy,
}

impl AuthCodeRepository for DbAuthCodeRepository {
    async fn count_active(&self, email: &str) -> Result<u64, ApiServiceError> {
        let now = Utc::now();
        read(&self.retry, "count active authcodes", || {
            auth_codes::Entity::find()
                .filter(auth_codes::Column::Email.eq(email))
                .filter(auth_codes::Column::UsedAt.is_null())
                .filter(auth_codes::Column::ExpiresAt.gt(now))
                .count(&self.db)
        })
        .await
    }

    async fn create(&self, code: &AuthCode) -> Result<(), ApiServiceError> {
        auth_codes::ActiveModel {
            id: Set(code.id),
            email: Set(code.email.clone()),
            code: Set(code.code.clone()),
            expires_at: Set(code.expires_at),
            used_at: Set(None),
            created_at: Set(code.created_at),
        }
        .insert(&self.db)
        .await
        .db_context("create authcode")?;
        Ok(())
    }

    async fn find_valid(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<AuthCode>, ApiServiceError> {
        let now = Utc::now();
        let model = read(&self.retry, "find valid authcode", || {
            auth_codes::Entity::find()
                .filter(auth_codes::Column::Email.eq(email))
                .filter(auth_codes::Column::Code.eq(code))
                .filter(auth_codes::Column::UsedAt.is_null())
                .filter(auth_codes::Column::ExpiresAt.gt(now))
                .one(&self.db)
        })
        .await?;
        Ok(model.map(authcode_from_model))
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let result = auth_codes::Entity::update_many()
            .col_expr(auth_codes::Column::UsedAt, Expr::value(Utc::now()))
            .filter(auth_codes::Column::Id.eq(id))
            .filter(auth_codes::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .db_context("mark authcode used")?;
        Ok(result.rows_affected == 1)
    }
}

fn authcode_from_model(model: auth_codes::Model) -> AuthCode {
    AuthCode {
        id: model.id,
        email: model.email,
        code: model.code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}
