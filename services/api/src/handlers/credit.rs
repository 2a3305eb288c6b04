use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_auth_types::identity::{AdminIdentity, Identity};
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};
use hub_domain::credit::CreditTxKind;

use crate::domain::types::CreditTransaction;
use crate::error::ApiServiceError;
use crate::handlers::resource::PageQuery;
use crate::state::AppState;
use crate::usecase::credit::{
    AdjustCreditsInput, AdjustCreditsUseCase, GetBalanceUseCase, ListTransactionsUseCase,
    UnlockResourceUseCase,
};

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: i64,
    pub balance_after: i64,
    pub kind: CreditTxKind,
    pub reference_id: Option<Uuid>,
    pub note: Option<String>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CreditTransaction> for TransactionResponse {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            balance_after: tx.balance_after,
            kind: tx.kind,
            reference_id: tx.reference_id,
            note: tx.note,
            created_at: tx.created_at,
        }
    }
}

// ── GET /api/credits ─────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn get_balance(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetBalanceUseCase {
        credits: state.credit_repo(),
    };
    let balance = uc.execute(identity.user_id).await?;
    Ok(ApiResponse(BalanceResponse { balance }))
}

// ── GET /api/credits/transactions ────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    identity: Identity,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListTransactionsUseCase {
        credits: state.credit_repo(),
    };
    let txs = uc.execute(identity.user_id, query.page_request()).await?;
    Ok(ApiResponse(txs.map(TransactionResponse::from)))
}

// ── POST /api/resources/{id}/unlock ──────────────────────────────────────────

#[derive(Serialize)]
pub struct UnlockResponse {
    pub charged: i64,
    pub balance: i64,
    pub link: String,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, resource_id = %id))]
pub async fn unlock_resource(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = UnlockResourceUseCase {
        credits: state.credit_repo(),
        resources: state.resource_repo(),
    };
    let out = uc.execute(identity.actor(), id).await?;
    Ok(ApiResponse(UnlockResponse {
        charged: out.charged,
        balance: out.balance,
        link: out.link,
    }))
}

// ── POST /api/admin/users/{id}/credits ───────────────────────────────────────

#[derive(Deserialize)]
pub struct AdjustCreditsRequest {
    pub amount: i64,
    pub reason: String,
}

#[tracing::instrument(skip_all, fields(admin = %admin.user_id, user_id = %user_id))]
pub async fn adjust_credits(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    ValidPath(user_id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<AdjustCreditsRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = AdjustCreditsUseCase {
        credits: state.credit_repo(),
    };
    let balance = uc
        .execute(
            admin.actor(),
            user_id,
            AdjustCreditsInput {
                amount: body.amount,
                reason: body.reason,
            },
        )
        .await?;
    Ok(ApiResponse(BalanceResponse { balance }))
}
