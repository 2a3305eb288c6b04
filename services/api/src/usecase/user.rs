use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};

use crate::domain::repository::UserRepository;
use crate::domain::types::{MAX_USER_NAME_LEN, User, validate_link};
use crate::error::ApiServiceError;

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetMeUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ApiServiceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiServiceError::UserNotFound)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

pub struct UpdateMeInput {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct UpdateMeUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateMeUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateMeInput) -> Result<User, ApiServiceError> {
        if input.name.is_none() && input.avatar_url.is_none() {
            return Err(ApiServiceError::invalid("nothing to update"));
        }
        let name = input
            .name
            .as_deref()
            .map(|name| {
                let name = name.trim();
                let len = name.chars().count();
                if len == 0 || len > MAX_USER_NAME_LEN {
                    Err(ApiServiceError::invalid(format!(
                        "name must be 1-{MAX_USER_NAME_LEN} characters"
                    )))
                } else {
                    Ok(name.to_owned())
                }
            })
            .transpose()?;
        let avatar_url = input.avatar_url.as_deref().map(validate_link).transpose()?;

        self.repo
            .update_profile(user_id, name.as_deref(), avatar_url.as_deref())
            .await?
            .ok_or(ApiServiceError::UserNotFound)
    }
}

// ── ListUsers (admin) ────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiServiceError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.search(search, page).await
    }
}
