use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::user::Actor;

use crate::domain::repository::{CreditRepository, ResourceRepository};
use crate::domain::types::{CreditTransaction, UnlockOutcome};
use crate::error::ApiServiceError;
use crate::usecase::resource::find_visible;

const MAX_ADJUST_REASON_LEN: usize = 200;
pub const MAX_ADJUST_AMOUNT: i64 = 1_000_000;

// ── Balance ──────────────────────────────────────────────────────────────────

pub struct GetBalanceUseCase<C: CreditRepository> {
    pub credits: C,
}

impl<C: CreditRepository> GetBalanceUseCase<C> {
    pub async fn execute(&self, user_id: Uuid) -> Result<i64, ApiServiceError> {
        self.credits
            .balance(user_id)
            .await?
            .ok_or(ApiServiceError::UserNotFound)
    }
}

// ── Transactions ─────────────────────────────────────────────────────────────

pub struct ListTransactionsUseCase<C: CreditRepository> {
    pub credits: C,
}

impl<C: CreditRepository> ListTransactionsUseCase<C> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<CreditTransaction>, ApiServiceError> {
        self.credits.transactions(user_id, page).await
    }
}

// ── Unlock ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockResult {
    pub charged: i64,
    pub balance: i64,
    pub link: String,
}

pub struct UnlockResourceUseCase<C, R>
where
    C: CreditRepository,
    R: ResourceRepository,
{
    pub credits: C,
    pub resources: R,
}

impl<C, R> UnlockResourceUseCase<C, R>
where
    C: CreditRepository,
    R: ResourceRepository,
{
    pub async fn execute(&self, actor: Actor, resource_id: Uuid) -> Result<UnlockResult, ApiServiceError> {
        let resource = find_visible(&self.resources, resource_id, Some(actor)).await?;

        if resource.is_free() || actor.can_manage(resource.owner_id) {
            let balance = self
                .credits
                .balance(actor.user_id)
                .await?
                .ok_or(ApiServiceError::UserNotFound)?;
            return Ok(UnlockResult {
                charged: 0,
                balance,
                link: resource.link,
            });
        }

        match self.credits.unlock(actor.user_id, &resource).await? {
            UnlockOutcome::Unlocked { balance } => {
                tracing::info!(
                    user_id = %actor.user_id,
                    resource_id = %resource.id,
                    price = resource.price_credits,
                    "resource unlocked"
                );
                Ok(UnlockResult {
                    charged: resource.price_credits,
                    balance,
                    link: resource.link,
                })
            }
            UnlockOutcome::AlreadyUnlocked { balance } => Ok(UnlockResult {
                charged: 0,
                balance,
                link: resource.link,
            }),
            UnlockOutcome::Insufficient => Err(ApiServiceError::InsufficientCredits),
        }
    }
}

// ── AdjustCredits (admin) ────────────────────────────────────────────────────

pub struct AdjustCreditsInput {
    pub amount: i64,
    pub reason: String,
}

pub struct AdjustCreditsUseCase<C: CreditRepository> {
    pub credits: C,
}

impl<C: CreditRepository> AdjustCreditsUseCase<C> {
    pub async fn execute(
        &self,
        admin: Actor,
        user_id: Uuid,
        input: AdjustCreditsInput,
    ) -> Result<i64, ApiServiceError> {
        if input.amount == 0 {
            return Err(ApiServiceError::invalid("amount must not be zero"));
        }
        if input.amount.unsigned_abs() > MAX_ADJUST_AMOUNT as u64 {
            return Err(ApiServiceError::invalid(format!(
                "amount must be within ±{MAX_ADJUST_AMOUNT}"
            )));
        }
        let reason = input.reason.trim();
        if reason.is_empty() || reason.chars().count() > MAX_ADJUST_REASON_LEN {
            return Err(ApiServiceError::invalid(format!(
                "reason must be 1-{MAX_ADJUST_REASON_LEN} characters"
            )));
        }
        self.credits
            .balance(user_id)
            .await?
            .ok_or(ApiServiceError::UserNotFound)?;

        let balance = self
            .credits
            .adjust(user_id, input.amount, reason)
            .await?
            .ok_or(ApiServiceError::InsufficientCredits)?;
        tracing::info!(
            admin_id = %admin.user_id,
            user_id = %user_id,
            amount = input.amount,
            balance,
            "credits adjusted"
        );
        Ok(balance)
    }
}
