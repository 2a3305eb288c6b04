use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::user::Actor;

use crate::domain::repository::{FavoriteRepository, ResourceRepository};
use crate::domain::types::FavoriteEntry;
use crate::error::ApiServiceError;
use crate::usecase::resource::find_visible;

// ── AddFavorite ──────────────────────────────────────────────────────────────

pub struct AddFavoriteUseCase<F, R>
where
    F: FavoriteRepository,
    R: ResourceRepository,
{
    pub favorites: F,
    pub resources: R,
}

impl<F, R> AddFavoriteUseCase<F, R>
where
    F: FavoriteRepository,
    R: ResourceRepository,
{
    /// Idempotent: a repeat call reports `true` without inserting again.
    pub async fn execute(&self, actor: Actor, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        find_visible(&self.resources, resource_id, Some(actor)).await?;
        let inserted = self.favorites.add(actor.user_id, resource_id).await?;
        if inserted {
            tracing::debug!(user_id = %actor.user_id, resource_id = %resource_id, "favorite added");
        }
        Ok(true)
    }
}

// ── RemoveFavorite ───────────────────────────────────────────────────────────

pub struct RemoveFavoriteUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> RemoveFavoriteUseCase<F> {
    pub async fn execute(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        self.favorites.remove(user_id, resource_id).await?;
        Ok(false)
    }
}

// ── FavoriteStatus ───────────────────────────────────────────────────────────

pub struct FavoriteStatusUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> FavoriteStatusUseCase<F> {
    pub async fn execute(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        self.favorites.exists(user_id, resource_id).await
    }
}

// ── ListFavorites ────────────────────────────────────────────────────────────

pub struct ListFavoritesUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> ListFavoritesUseCase<F> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<FavoriteEntry>, ApiServiceError> {
        self.favorites.list(user_id, page).await
    }
}
