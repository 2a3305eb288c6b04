use serde_json::json;
use uuid::Uuid;

use hub_domain::order::OrderStatus;
use hub_domain::user::Actor;

use hub_api::domain::types::PaymentOutcome;
use hub_api::error::ApiServiceError;
use hub_api::infra::payment::HmacVerifier;
use hub_api::usecase::order::{CreateOrderUseCase, GetOrderUseCase, PaymentWebhookUseCase};

use crate::helpers::{MockOrderRepo, WEBHOOK_SECRET, admin, member, test_order};

fn verifier() -> HmacVerifier {
    HmacVerifier {
        secret: WEBHOOK_SECRET.to_owned(),
    }
}

fn webhook(orders: &MockOrderRepo) -> PaymentWebhookUseCase<MockOrderRepo, HmacVerifier> {
    PaymentWebhookUseCase {
        orders: orders.clone(),
        verifier: verifier(),
    }
}

fn notification(order_id: Uuid, status: &str, amount_cents: i64) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "orderId": order_id,
        "status": status,
        "tradeNo": "T-20260101-0001",
        "amountCents": amount_cents,
    }))
    .unwrap()
}

// ── Signature ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_or_forged_signature() {
    let order = test_order(Uuid::new_v4(), OrderStatus::Pending);
    let orders = MockOrderRepo::new(vec![order.clone()]);
    let body = notification(order.id, "paid", order.amount_cents);
    let forged = HmacVerifier {
        secret: "someone-else".into(),
    }
    .sign(&body);

    let uc = webhook(&orders);
    assert!(matches!(
        uc.execute(&body, None).await,
        Err(ApiServiceError::InvalidSignature)
    ));
    assert!(matches!(
        uc.execute(&body, Some(&forged)).await,
        Err(ApiServiceError::InvalidSignature)
    ));
    assert_eq!(orders.status(order.id), Some(OrderStatus::Pending));
    assert_eq!(orders.balance(order.user_id), 0);
}

// ── Paid / replay ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_credit_once_when_notification_is_replayed() {
    let order = test_order(Uuid::new_v4(), OrderStatus::Pending);
    let orders = MockOrderRepo::new(vec![order.clone()]);
    let body = notification(order.id, "paid", order.amount_cents);
    let signature = verifier().sign(&body);
    let uc = webhook(&orders);

    let first = uc.execute(&body, Some(&signature)).await.unwrap();
    assert_eq!(first, PaymentOutcome::Credited { balance: 100 });

    let replay = uc.execute(&body, Some(&signature)).await.unwrap();
    assert_eq!(replay, PaymentOutcome::AlreadyPaid);

    assert_eq!(orders.balance(order.user_id), 100);
    assert_eq!(orders.status(order.id), Some(OrderStatus::Paid));
}

#[tokio::test]
async fn should_refuse_amount_mismatch() {
    let order = test_order(Uuid::new_v4(), OrderStatus::Pending);
    let orders = MockOrderRepo::new(vec![order.clone()]);
    let body = notification(order.id, "paid", 1);
    let signature = verifier().sign(&body);

    assert!(matches!(
        webhook(&orders).execute(&body, Some(&signature)).await,
        Err(ApiServiceError::InvalidParams(_))
    ));
    assert_eq!(orders.status(order.id), Some(OrderStatus::Pending));
}

#[tokio::test]
async fn should_mark_failed_and_ignore_late_paid() {
    let order = test_order(Uuid::new_v4(), OrderStatus::Pending);
    let orders = MockOrderRepo::new(vec![order.clone()]);
    let uc = webhook(&orders);

    let failed = notification(order.id, "failed", order.amount_cents);
    let outcome = uc
        .execute(&failed, Some(&verifier().sign(&failed)))
        .await
        .unwrap();
    assert_eq!(outcome, PaymentOutcome::NotPending(OrderStatus::Failed));

    let paid = notification(order.id, "paid", order.amount_cents);
    let outcome = uc
        .execute(&paid, Some(&verifier().sign(&paid)))
        .await
        .unwrap();
    assert_eq!(outcome, PaymentOutcome::NotPending(OrderStatus::Failed));
    assert_eq!(orders.balance(order.user_id), 0);
}

#[tokio::test]
async fn should_report_unknown_order() {
    let orders = MockOrderRepo::default();
    let body = notification(Uuid::new_v4(), "paid", 990);
    assert!(matches!(
        webhook(&orders)
            .execute(&body, Some(&verifier().sign(&body)))
            .await,
        Err(ApiServiceError::OrderNotFound)
    ));
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_order_from_package() {
    let orders = MockOrderRepo::default();
    let uc = CreateOrderUseCase {
        orders: orders.clone(),
        checkout_base: "https://pay.example.com/checkout".into(),
    };
    let user = Uuid::new_v4();

    let out = uc.execute(user, "standard").await.unwrap();
    assert_eq!(out.order.status, OrderStatus::Pending);
    assert_eq!(out.order.credits, 550);
    assert_eq!(out.order.amount_cents, 4990);
    assert_eq!(
        out.checkout_url,
        format!("https://pay.example.com/checkout?orderId={}", out.order.id)
    );
    assert_eq!(orders.status(out.order.id), Some(OrderStatus::Pending));

    assert!(matches!(
        uc.execute(user, "platinum").await,
        Err(ApiServiceError::InvalidParams(_))
    ));
}

#[tokio::test]
async fn should_show_order_to_owner_and_admin_only() {
    let owner = Uuid::new_v4();
    let order = test_order(owner, OrderStatus::Pending);
    let uc = GetOrderUseCase {
        orders: MockOrderRepo::new(vec![order.clone()]),
    };

    assert!(uc.execute(member(owner), order.id).await.is_ok());
    assert!(uc.execute(admin(), order.id).await.is_ok());
    let stranger = Actor {
        user_id: Uuid::new_v4(),
        is_admin: false,
    };
    assert!(matches!(
        uc.execute(stranger, order.id).await,
        Err(ApiServiceError::Forbidden)
    ));
}
