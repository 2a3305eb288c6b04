use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use bytes::Bytes;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use uuid::Uuid;

use hub_auth_types::admin::AdminAllowList;
use hub_auth_types::identity::AuthGate;
use hub_core::error::ErrorCode;
use hub_core::retry::RetryPolicy;
use hub_domain::pagination::MAX_PAGE;
use hub_testing::auth::{TEST_ADMIN_EMAIL, TEST_JWT_SECRET, TestIdentity};
use hub_testing::envelope::assert_envelope;

use hub_api_schema::resources;

use hub_api::infra::email::LettreMailer;
use hub_api::infra::payment::HmacVerifier;
use hub_api::router::build_router;
use hub_api::state::AppState;

use crate::helpers::WEBHOOK_SECRET;

/// A router over a mock database with no queued results. Any query the
/// handler issues shows up in the transaction log.
fn test_server() -> (TestServer, DatabaseConnection) {
    test_server_over(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

fn test_server_over(db: DatabaseConnection) -> (TestServer, DatabaseConnection) {
    let redis = deadpool_redis::Config::from_url("redis://127.0.0.1:6379")
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let spool = std::env::temp_dir().join(format!("hub-router-test-{}", Uuid::new_v4().simple()));
    let mailer = LettreMailer::new(
        None,
        "ResourceHub <noreply@hub.test>",
        spool.to_str().unwrap(),
    )
    .unwrap();

    let state = AppState {
        db: db.clone(),
        redis,
        gate: AuthGate::new(TEST_JWT_SECRET, AdminAllowList::new([TEST_ADMIN_EMAIL])),
        mailer,
        http: reqwest::Client::new(),
        llm: None,
        cookie_domain: "hub.test".into(),
        checkout_url: "https://pay.hub.test/checkout".into(),
        webhook_secret: WEBHOOK_SECRET.into(),
        retry: RetryPolicy::none(),
        signup_bonus: 0,
    };
    (TestServer::new(build_router(state)).unwrap(), db)
}

fn assert_no_queries(db: DatabaseConnection) {
    let log = db.into_transaction_log();
    assert!(log.is_empty(), "unexpected queries: {log:?}");
}

#[tokio::test]
async fn should_answer_healthz_with_request_id() {
    let (server, _db) = test_server();
    let resp = server.get("/healthz").await;
    resp.assert_status(StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_require_token_before_touching_the_database() {
    let (server, db) = test_server();
    let resp = server.get("/api/credits").await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Unauthorized);
    assert_no_queries(db);
}

#[tokio::test]
async fn should_forbid_admin_routes_to_members() {
    let (server, db) = test_server();
    let user = TestIdentity::user();
    let (name, value) = user.bearer();

    let resp = server
        .post(&format!("/api/admin/resources/{}/toggle-top", Uuid::new_v4()))
        .add_header(name.clone(), value.clone())
        .await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Forbidden);

    let resp = server
        .get("/api/admin/stats")
        .add_header(name, value)
        .await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Forbidden);
    assert_no_queries(db);
}

#[tokio::test]
async fn should_reject_forged_webhook_before_loading_the_order() {
    let (server, db) = test_server();
    let payload = serde_json::to_vec(&json!({
        "orderId": Uuid::new_v4(),
        "status": "paid",
        "tradeNo": "T-1",
        "amountCents": 990,
    }))
    .unwrap();
    let forged = HmacVerifier {
        secret: "not-the-secret".into(),
    }
    .sign(&payload);

    let resp = server
        .post("/api/payments/webhook")
        .add_header(
            HeaderName::from_static("x-payment-signature"),
            HeaderValue::from_str(&forged).unwrap(),
        )
        .bytes(Bytes::from(payload.clone()))
        .await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Unauthorized);

    let resp = server
        .post("/api/payments/webhook")
        .bytes(Bytes::from(payload))
        .await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Unauthorized);
    assert_no_queries(db);
}

#[tokio::test]
async fn should_reject_malformed_ids_as_invalid_params() {
    let (server, db) = test_server();
    let resp = server.get("/api/resources/not-a-uuid").await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::InvalidParams);
    assert_no_queries(db);
}

#[tokio::test]
async fn should_list_credit_packages_publicly() {
    let (server, db) = test_server();
    let resp = server.get("/api/orders/packages").await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Ok);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["starter", "standard", "pro"]);
    assert_eq!(body["data"][0]["priceCents"], 990);
    assert_no_queries(db);
}

#[tokio::test]
async fn should_clear_cookie_on_logout() {
    let (server, db) = test_server();
    let resp = server.delete("/api/auth/token").await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Ok);
    assert_eq!(body["data"]["loggedOut"], true);
    assert!(resp.headers().contains_key("set-cookie"));
    assert_no_queries(db);
}

// ── Pagination ───────────────────────────────────────────────────────────────

/// Count and page queries of an empty listing.
fn empty_listing_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<resources::Model>::new(), Vec::new()])
        .into_connection()
}

#[tokio::test]
async fn should_clamp_page_window_from_query_string() {
    let cases = [
        ("pageSize=1000", 1, 100),
        ("page=0&pageSize=10", 1, 10),
        ("page=-4", 1, 20),
        ("limit=10&offset=25", 3, 10),
        ("limit=1000&offset=-5", 1, 100),
        ("page=9223372036854775807&pageSize=100", MAX_PAGE, 100),
    ];
    for (query, page, page_size) in cases {
        let (server, db) = test_server_over(empty_listing_db());
        let resp = server.get(&format!("/api/resources?{query}")).await;
        let body: Value = resp.json();
        assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::Ok);
        assert_eq!(body["data"]["page"], page, "page for {query}");
        assert_eq!(body["data"]["pageSize"], page_size, "pageSize for {query}");
        assert_eq!(body["data"]["total"], 0);
        assert_eq!(db.into_transaction_log().len(), 2, "queries for {query}");
    }
}

#[tokio::test]
async fn should_reject_page_beyond_integer_range() {
    let (server, db) = test_server();
    let resp = server
        .get("/api/resources?page=99999999999999999999")
        .await;
    let body: Value = resp.json();
    assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::InvalidParams);
    assert_no_queries(db);
}

// ── Admin credits ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_extreme_credit_adjustment_before_querying() {
    let (server, db) = test_server();
    let (name, value) = TestIdentity::admin().bearer();
    for amount in [i64::MIN, i64::MAX] {
        let resp = server
            .post(&format!("/api/admin/users/{}/credits", Uuid::new_v4()))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "amount": amount, "reason": "cleanup" }))
            .await;
        let body: Value = resp.json();
        assert_envelope(resp.status_code().as_u16(), &body, ErrorCode::InvalidParams);
    }
    assert_no_queries(db);
}
