use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use hub_auth_types::identity::AuthGate;
use hub_core::retry::RetryPolicy;

use crate::config::LlmConfig;
use crate::infra::cache::RedisBatchTaskStore;
use crate::infra::db::{
    DbAuthCodeRepository, DbCategoryRepository, DbCreditRepository, DbFavoriteRepository,
    DbOrderRepository, DbRatingRepository, DbResourceRepository, DbStatsRepository,
    DbTagRepository, DbUserRepository,
};
use crate::infra::email::LettreMailer;
use crate::infra::link_check::HttpLinkChecker;
use crate::infra::llm::LlmEnricher;
use crate::infra::payment::HmacVerifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub gate: AuthGate,
    pub mailer: LettreMailer,
    pub http: reqwest::Client,
    pub llm: Option<LlmConfig>,
    pub cookie_domain: String,
    pub checkout_url: String,
    pub webhook_secret: String,
    pub retry: RetryPolicy,
    pub signup_bonus: i64,
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl AppState {
    pub fn jwt_secret(&self) -> String {
        self.gate.jwt_secret.to_string()
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn auth_code_repo(&self) -> DbAuthCodeRepository {
        DbAuthCodeRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn resource_repo(&self) -> DbResourceRepository {
        DbResourceRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn rating_repo(&self) -> DbRatingRepository {
        DbRatingRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn credit_repo(&self) -> DbCreditRepository {
        DbCreditRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn stats_repo(&self) -> DbStatsRepository {
        DbStatsRepository {
            db: self.db.clone(),
            retry: self.retry,
        }
    }

    pub fn batch_store(&self) -> RedisBatchTaskStore {
        RedisBatchTaskStore {
            pool: self.redis.clone(),
        }
    }

    pub fn link_checker(&self) -> HttpLinkChecker {
        HttpLinkChecker {
            client: self.http.clone(),
        }
    }

    /// `None` when no LLM endpoint is configured.
    pub fn enricher(&self) -> Option<LlmEnricher> {
        self.llm
            .clone()
            .map(|config| LlmEnricher::new(self.http.clone(), config))
    }

    pub fn signature_verifier(&self) -> HmacVerifier {
        HmacVerifier {
            secret: self.webhook_secret.clone(),
        }
    }
}
