use uuid::Uuid;

use hub_domain::rating::RatingValue;
use hub_domain::user::Actor;

use crate::domain::repository::{RatingRepository, ResourceRepository};
use crate::domain::types::RatingSummary;
use crate::error::ApiServiceError;
use crate::usecase::resource::find_visible;

pub struct RateResourceUseCase<T, R>
where
    T: RatingRepository,
    R: ResourceRepository,
{
    pub ratings: T,
    pub resources: R,
}

impl<T, R> RateResourceUseCase<T, R>
where
    T: RatingRepository,
    R: ResourceRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        resource_id: Uuid,
        value: i64,
    ) -> Result<RatingSummary, ApiServiceError> {
        let value =
            RatingValue::try_from(value).map_err(|e| ApiServiceError::invalid(e.to_string()))?;
        let resource = find_visible(&self.resources, resource_id, Some(actor)).await?;
        if resource.owner_id == actor.user_id {
            return Err(ApiServiceError::Forbidden);
        }
        self.ratings
            .upsert(actor.user_id, resource_id, i16::from(value.get()))
            .await
    }
}

pub struct RemoveRatingUseCase<T: RatingRepository> {
    pub ratings: T,
}

impl<T: RatingRepository> RemoveRatingUseCase<T> {
    pub async fn execute(&self, user_id: Uuid, resource_id: Uuid) -> Result<RatingSummary, ApiServiceError> {
        self.ratings.remove(user_id, resource_id).await?;
        self.ratings.summary(resource_id, Some(user_id)).await
    }
}

pub struct RatingSummaryUseCase<T, R>
where
    T: RatingRepository,
    R: ResourceRepository,
{
    pub ratings: T,
    pub resources: R,
}

impl<T, R> RatingSummaryUseCase<T, R>
where
    T: RatingRepository,
    R: ResourceRepository,
{
    pub async fn execute(
        &self,
        resource_id: Uuid,
        actor: Option<Actor>,
    ) -> Result<RatingSummary, ApiServiceError> {
        find_visible(&self.resources, resource_id, actor).await?;
        self.ratings
            .summary(resource_id, actor.map(|a| a.user_id))
            .await
    }
}
