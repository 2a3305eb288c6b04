use chrono::Utc;
use uuid::Uuid;

use hub_domain::credit::find_package;
use hub_domain::order::OrderStatus;
use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::user::Actor;

use crate::domain::repository::{OrderRepository, SignatureVerifier};
use crate::domain::types::{Order, PaymentNotification, PaymentOutcome, PaymentResult};
use crate::error::ApiServiceError;

/// `base?orderId=<id>`, keeping any query the base already carries.
pub fn checkout_url(base: &str, order_id: Uuid) -> Result<String, ApiServiceError> {
    let mut url = url::Url::parse(base)
        .map_err(|e| ApiServiceError::Internal(anyhow::anyhow!("invalid checkout url: {e}")))?;
    url.query_pairs_mut()
        .append_pair("orderId", &order_id.to_string());
    Ok(url.into())
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CreateOrderOutput {
    pub order: Order,
    pub checkout_url: String,
}

pub struct CreateOrderUseCase<O: OrderRepository> {
    pub orders: O,
    pub checkout_base: String,
}

impl<O: OrderRepository> CreateOrderUseCase<O> {
    pub async fn execute(&self, user_id: Uuid, package_id: &str) -> Result<CreateOrderOutput, ApiServiceError> {
        let package = find_package(package_id.trim())
            .ok_or_else(|| ApiServiceError::invalid("unknown credit package"))?;
        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            user_id,
            package_id: package.id.to_owned(),
            credits: package.credits,
            amount_cents: package.price_cents,
            status: OrderStatus::Pending,
            trade_no: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.create(&order).await?;
        let checkout_url = checkout_url(&self.checkout_base, order.id)?;
        tracing::info!(order_id = %order.id, user_id = %user_id, package = package.id, "order created");
        Ok(CreateOrderOutput {
            order,
            checkout_url,
        })
    }
}

// ── GetOrder ─────────────────────────────────────────────────────────────────

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(&self, actor: Actor, id: Uuid) -> Result<Order, ApiServiceError> {
        let order = self
            .orders
            .find(id)
            .await?
            .ok_or(ApiServiceError::OrderNotFound)?;
        if !actor.can_manage(order.user_id) {
            return Err(ApiServiceError::Forbidden);
        }
        Ok(order)
    }
}

// ── ListOrders ───────────────────────────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid, page: PageRequest) -> Result<Paginated<Order>, ApiServiceError> {
        self.orders.list_by_user(user_id, page).await
    }
}

// ── PaymentWebhook ───────────────────────────────────────────────────────────

pub struct PaymentWebhookUseCase<O, V>
where
    O: OrderRepository,
    V: SignatureVerifier,
{
    pub orders: O,
    pub verifier: V,
}

impl<O, V> PaymentWebhookUseCase<O, V>
where
    O: OrderRepository,
    V: SignatureVerifier,
{
    pub async fn execute(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<PaymentOutcome, ApiServiceError> {
        let signature = signature.ok_or(ApiServiceError::InvalidSignature)?;
        if !self.verifier.verify(body, signature) {
            tracing::warn!("payment webhook signature mismatch");
            return Err(ApiServiceError::InvalidSignature);
        }

        let notification: PaymentNotification = serde_json::from_slice(body)
            .map_err(|e| ApiServiceError::invalid(format!("invalid notification: {e}")))?;
        let order = self
            .orders
            .find(notification.order_id)
            .await?
            .ok_or(ApiServiceError::OrderNotFound)?;

        match notification.status {
            PaymentResult::Paid => {
                if notification.amount_cents != order.amount_cents {
                    tracing::warn!(
                        order_id = %order.id,
                        expected = order.amount_cents,
                        got = notification.amount_cents,
                        "payment amount mismatch"
                    );
                    return Err(ApiServiceError::invalid("amount mismatch"));
                }
                let outcome = self.orders.settle_paid(&order, &notification.trade_no).await?;
                match outcome {
                    PaymentOutcome::Credited { balance } => tracing::info!(
                        order_id = %order.id,
                        user_id = %order.user_id,
                        credits = order.credits,
                        balance,
                        "order paid"
                    ),
                    PaymentOutcome::AlreadyPaid => {
                        tracing::info!(order_id = %order.id, "duplicate payment notification")
                    }
                    PaymentOutcome::NotPending(status) => {
                        tracing::warn!(order_id = %order.id, status = status.as_str(), "paid notification for closed order")
                    }
                }
                Ok(outcome)
            }
            PaymentResult::Failed => {
                if self.orders.mark_failed(order.id, &notification.trade_no).await? {
                    tracing::info!(order_id = %order.id, "order payment failed");
                    Ok(PaymentOutcome::NotPending(OrderStatus::Failed))
                } else {
                    let current = self
                        .orders
                        .find(order.id)
                        .await?
                        .map(|o| o.status)
                        .unwrap_or(order.status);
                    Ok(match current {
                        OrderStatus::Paid => PaymentOutcome::AlreadyPaid,
                        other => PaymentOutcome::NotPending(other),
                    })
                }
            }
        }
    }
}
