use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use hub_auth_types::cookie::ACCESS_TOKEN_EXP;
use hub_auth_types::token::issue_access_token;

use crate::domain::repository::{AuthCodeRepository, Mailer, UserRepository};
use crate::domain::types::{
    AUTHCODE_LEN, AUTHCODE_TTL_SECS, AuthCode, MAX_ACTIVE_AUTHCODES, MAX_USER_NAME_LEN, User,
};
use crate::error::ApiServiceError;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..AUTHCODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Trim and lowercase; reject anything without a local part and a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, ApiServiceError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(ApiServiceError::invalid("invalid email"));
    }
    Ok(email)
}

fn default_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local.chars().take(MAX_USER_NAME_LEN).collect()
}

// ── CreateAuthcode ───────────────────────────────────────────────────────────

pub struct CreateAuthcodeInput {
    pub email: String,
}

pub struct CreateAuthcodeUseCase<A, M>
where
    A: AuthCodeRepository,
    M: Mailer,
{
    pub auth_codes: A,
    pub mailer: M,
}

impl<A, M> CreateAuthcodeUseCase<A, M>
where
    A: AuthCodeRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: CreateAuthcodeInput) -> Result<(), ApiServiceError> {
        let email = normalize_email(&input.email)?;

        let active = self.auth_codes.count_active(&email).await?;
        if active >= MAX_ACTIVE_AUTHCODES {
            return Err(ApiServiceError::TooManyAuthcodes);
        }

        let now = Utc::now();
        let code = AuthCode {
            id: Uuid::now_v7(),
            email: email.clone(),
            code: generate_code(),
            expires_at: now + Duration::seconds(AUTHCODE_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        self.auth_codes.create(&code).await?;
        self.mailer.send_authcode(&email, &code.code).await?;
        Ok(())
    }
}

// ── CreateToken ──────────────────────────────────────────────────────────────

pub struct CreateTokenInput {
    pub email: String,
    pub code: String,
}

#[derive(Debug)]
pub struct CreateTokenOutput {
    pub access_token: String,
    /// Seconds since epoch.
    pub expires_at: u64,
    pub user: User,
    pub created: bool,
}

pub struct CreateTokenUseCase<U, A>
where
    U: UserRepository,
    A: AuthCodeRepository,
{
    pub users: U,
    pub auth_codes: A,
    pub jwt_secret: String,
    pub signup_bonus: i64,
}

impl<U, A> CreateTokenUseCase<U, A>
where
    U: UserRepository,
    A: AuthCodeRepository,
{
    pub async fn execute(&self, input: CreateTokenInput) -> Result<CreateTokenOutput, ApiServiceError> {
        let email = normalize_email(&input.email)?;
        let code = self
            .auth_codes
            .find_valid(&email, input.code.trim())
            .await?
            .ok_or(ApiServiceError::InvalidAuthcode)?;
        if !self.auth_codes.mark_used(code.id).await? {
            return Err(ApiServiceError::InvalidAuthcode);
        }

        let (user, created) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let user = self
                    .users
                    .create(&email, &default_name(&email), self.signup_bonus.max(0))
                    .await?;
                tracing::info!(user_id = %user.id, "account created");
                (user, true)
            }
        };

        let expires_at = Utc::now().timestamp() as u64 + ACCESS_TOKEN_EXP;
        let access_token = issue_access_token(user.id, &user.email, expires_at, &self.jwt_secret)
            .map_err(|e| ApiServiceError::Internal(e.into()))?;

        Ok(CreateTokenOutput {
            access_token,
            expires_at,
            user,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_numeric_codes() {
        for _ in 0..20 {
            let code = generate_code();
            assert_eq!(code.len(), AUTHCODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn should_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(normalize_email("alice").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("alice@localhost").is_err());
        assert!(normalize_email("alice@.com").is_err());
    }

    #[test]
    fn should_derive_default_name_from_local_part() {
        assert_eq!(default_name("alice@example.com"), "alice");
        assert_eq!(default_name(&format!("{}@x.io", "a".repeat(80))).len(), MAX_USER_NAME_LEN);
    }
}
