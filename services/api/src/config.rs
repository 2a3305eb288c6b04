use hub_core::config::{list, optional, or_default, required};

/// SMTP relay settings. Absent `SMTP_HOST` means mail is spooled to disk.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// OpenAI-compatible chat-completions endpoint used for enrichment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (batch upload task state).
    pub redis_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Emails granted admin privileges. Env var: `ADMIN_EMAILS` (comma separated).
    pub admin_emails: Vec<String>,
    /// Cookie domain attribute.
    pub cookie_domain: String,
    /// TCP port to listen on (default 3000). Env var: `API_PORT`.
    pub api_port: u16,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    /// Directory for the file mail transport when SMTP is not configured.
    pub mail_spool_dir: String,
    /// Shared secret for `x-payment-signature` verification.
    pub payment_webhook_secret: String,
    /// Hosted checkout page; the order id is appended as `orderId`.
    pub payment_checkout_url: String,
    pub llm: Option<LlmConfig>,
    /// Attempts per read query, including the first (default 3).
    pub db_retry_attempts: u32,
    /// Credits granted on account creation (default 0).
    pub signup_bonus_credits: i64,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let smtp = optional("SMTP_HOST").map(|host| SmtpConfig {
            host,
            port: or_default("SMTP_PORT", 587),
            username: optional("SMTP_USERNAME").unwrap_or_default(),
            password: optional("SMTP_PASSWORD").unwrap_or_default(),
        });
        let llm = match (optional("LLM_API_URL"), optional("LLM_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(LlmConfig {
                api_url,
                api_key,
                model: optional("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_owned()),
            }),
            _ => None,
        };
        Self {
            database_url: required("DATABASE_URL"),
            redis_url: required("REDIS_URL"),
            jwt_secret: required("JWT_SECRET"),
            admin_emails: list("ADMIN_EMAILS"),
            cookie_domain: required("COOKIE_DOMAIN"),
            api_port: or_default("API_PORT", 3000),
            smtp,
            mail_from: optional("MAIL_FROM")
                .unwrap_or_else(|| "ResourceHub <no-reply@localhost>".to_owned()),
            mail_spool_dir: optional("MAIL_SPOOL_DIR").unwrap_or_else(|| "./mail".to_owned()),
            payment_webhook_secret: required("PAYMENT_WEBHOOK_SECRET"),
            payment_checkout_url: required("PAYMENT_CHECKOUT_URL"),
            llm,
            db_retry_attempts: or_default("DB_RETRY_ATTEMPTS", 3),
            signup_bonus_credits: or_default("SIGNUP_BONUS_CREDITS", 0),
        }
    }
}
