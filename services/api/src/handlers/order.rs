use axum::{extract::State, http::HeaderMap, response::IntoResponse};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_auth_types::identity::Identity;
use hub_core::envelope::ApiResponse;
use hub_core::extract::{ValidJson, ValidPath, ValidQuery};
use hub_domain::credit::CREDIT_PACKAGES;
use hub_domain::order::OrderStatus;

use crate::domain::types::{Order, PaymentOutcome};
use crate::error::ApiServiceError;
use crate::handlers::resource::PageQuery;
use crate::state::AppState;
use crate::usecase::order::{
    CreateOrderUseCase, GetOrderUseCase, ListOrdersUseCase, PaymentWebhookUseCase,
};

pub const PAYMENT_SIGNATURE_HEADER: &str = "x-payment-signature";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub package_id: String,
    pub credits: i64,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub trade_no: Option<String>,
    #[serde(serialize_with = "hub_core::serde::opt_to_rfc3339_ms")]
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "hub_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            package_id: o.package_id,
            credits: o.credits,
            amount_cents: o.amount_cents,
            status: o.status,
            trade_no: o.trade_no,
            paid_at: o.paid_at,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

// ── GET /api/orders/packages ─────────────────────────────────────────────────

pub async fn list_packages() -> impl IntoResponse {
    ApiResponse(CREDIT_PACKAGES)
}

// ── POST /api/orders ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub package_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub checkout_url: String,
}

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create_order(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(body): ValidJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = CreateOrderUseCase {
        orders: state.order_repo(),
        checkout_base: state.checkout_url.clone(),
    };
    let out = uc.execute(identity.user_id, &body.package_id).await?;
    Ok(ApiResponse(CreateOrderResponse {
        order: out.order.into(),
        checkout_url: out.checkout_url,
    }))
}

// ── GET /api/orders ──────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_orders(
    State(state): State<AppState>,
    identity: Identity,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = uc.execute(identity.user_id, query.page_request()).await?;
    Ok(ApiResponse(orders.map(OrderResponse::from)))
}

// ── GET /api/orders/{id} ─────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(user_id = %identity.user_id, order_id = %id))]
pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<impl IntoResponse, ApiServiceError> {
    let uc = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = uc.execute(identity.actor(), id).await?;
    Ok(ApiResponse(OrderResponse::from(order)))
}

// ── POST /api/payments/webhook ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl From<PaymentOutcome> for WebhookAck {
    fn from(outcome: PaymentOutcome) -> Self {
        let (outcome, status) = match outcome {
            PaymentOutcome::Credited { .. } => ("credited", Some(OrderStatus::Paid)),
            PaymentOutcome::AlreadyPaid => ("already_paid", Some(OrderStatus::Paid)),
            PaymentOutcome::NotPending(status) => ("not_pending", Some(status)),
        };
        Self {
            received: true,
            outcome,
            status,
        }
    }
}

/// The body is taken raw: the signature covers the exact bytes sent.
#[tracing::instrument(skip_all)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiServiceError> {
    let signature = headers
        .get(PAYMENT_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let uc = PaymentWebhookUseCase {
        orders: state.order_repo(),
        verifier: state.signature_verifier(),
    };
    let outcome = uc.execute(&body, signature).await?;
    Ok(ApiResponse(WebhookAck::from(outcome)))
}
