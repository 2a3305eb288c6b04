use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};

use crate::domain::repository::TagRepository;
use crate::domain::types::{Tag, validate_tag_name};
use crate::error::ApiServiceError;

pub struct ListTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> ListTagsUseCase<R> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Tag>, ApiServiceError> {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        self.repo.list(search.as_deref(), page).await
    }
}

pub struct CreateTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> CreateTagUseCase<R> {
    pub async fn execute(&self, name: &str) -> Result<Tag, ApiServiceError> {
        let name = validate_tag_name(name)?;
        self.repo.create(&name).await
    }
}

pub struct DeleteTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> DeleteTagUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ApiServiceError::TagNotFound);
        }
        Ok(())
    }
}
