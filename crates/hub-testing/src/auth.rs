//! Signed identities for router tests.
//!
//! Router tests go through the real gate, so requests need a token signed
//! with the same secret the test state uses.

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use hub_auth_types::cookie::HUB_ACCESS_TOKEN;
use hub_auth_types::token::issue_access_token;

pub const TEST_JWT_SECRET: &str = "hub-testing-jwt-secret";
pub const TEST_ADMIN_EMAIL: &str = "admin@hub.test";

pub struct TestIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestIdentity {
    pub fn new(email: &str) -> Self {
        Self::with_id(Uuid::new_v4(), email)
    }

    pub fn with_id(user_id: Uuid, email: &str) -> Self {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        let token = issue_access_token(user_id, email, exp, TEST_JWT_SECRET).unwrap();
        Self {
            user_id,
            email: email.to_owned(),
            token,
        }
    }

    /// A caller whose email is on the test allow-list.
    pub fn admin() -> Self {
        Self::new(TEST_ADMIN_EMAIL)
    }

    pub fn user() -> Self {
        Self::new(&format!("user-{}@hub.test", Uuid::new_v4().simple()))
    }

    pub fn bearer(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        )
    }

    pub fn cookie(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&format!("{HUB_ACCESS_TOKEN}={}", self.token)).unwrap(),
        )
    }
}
