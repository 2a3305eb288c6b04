use sea_orm::Database;
use tracing::info;

use hub_auth_types::admin::AdminAllowList;
use hub_auth_types::identity::AuthGate;
use hub_core::retry::RetryPolicy;
use hub_core::tracing::init_tracing;

use hub_api::config::ApiConfig;
use hub_api::infra::email::LettreMailer;
use hub_api::router::build_router;
use hub_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let mailer = LettreMailer::new(
        config.smtp.as_ref(),
        &config.mail_from,
        &config.mail_spool_dir,
    )
    .expect("failed to configure mail transport");
    if config.smtp.is_none() {
        info!(dir = %config.mail_spool_dir, "SMTP not configured, spooling mail to disk");
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("resourcehub/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        db,
        redis,
        gate: AuthGate::new(
            config.jwt_secret.as_str(),
            AdminAllowList::new(config.admin_emails),
        ),
        mailer,
        http,
        llm: config.llm,
        cookie_domain: config.cookie_domain,
        checkout_url: config.payment_checkout_url,
        webhook_secret: config.payment_webhook_secret,
        retry: RetryPolicy::with_attempts(config.db_retry_attempts),
        signup_bonus: config.signup_bonus_credits,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
