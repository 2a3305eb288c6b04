use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::resource::ResourceStatus;
use hub_domain::user::Actor;

use crate::domain::repository::{CategoryRepository, LinkChecker, ResourceRepository};
use crate::domain::types::{
    LinkCheck, Resource, ResourceChanges, ResourceFilter, ResourceInput, ResourceView,
    normalize_tags, validate_description, validate_link, validate_price, validate_title,
};
use crate::error::ApiServiceError;

/// Load a resource the caller may see. Non-approved resources are only
/// visible to their owner and admins; everyone else gets not-found.
pub async fn find_visible<R: ResourceRepository>(
    repo: &R,
    id: Uuid,
    actor: Option<Actor>,
) -> Result<Resource, ApiServiceError> {
    let resource = repo
        .find(id)
        .await?
        .ok_or(ApiServiceError::ResourceNotFound)?;
    let privileged = actor.is_some_and(|a| a.can_manage(resource.owner_id));
    if resource.status != ResourceStatus::Approved && !privileged {
        return Err(ApiServiceError::ResourceNotFound);
    }
    Ok(resource)
}

/// The link is shown for free resources, to owner/admin, and to buyers.
pub async fn link_visible<R: ResourceRepository>(
    repo: &R,
    resource: &Resource,
    actor: Option<Actor>,
) -> Result<bool, ApiServiceError> {
    if resource.is_free() {
        return Ok(true);
    }
    match actor {
        Some(a) if a.can_manage(resource.owner_id) => Ok(true),
        Some(a) => repo.has_unlocked(a.user_id, resource.id).await,
        None => Ok(false),
    }
}

async fn ensure_category<C: CategoryRepository>(
    categories: &C,
    category_id: Option<Uuid>,
) -> Result<(), ApiServiceError> {
    if let Some(id) = category_id {
        categories
            .find(id)
            .await?
            .ok_or(ApiServiceError::CategoryNotFound)?;
    }
    Ok(())
}

/// Validate and insert one resource. Shared by single create and batch upload.
pub async fn create_resource<R, C>(
    resources: &R,
    categories: &C,
    owner_id: Uuid,
    input: ResourceInput,
) -> Result<Resource, ApiServiceError>
where
    R: ResourceRepository,
    C: CategoryRepository,
{
    let input = input.normalize()?;
    ensure_category(categories, input.category_id).await?;
    let resource = resources.create(owner_id, &input).await?;
    tracing::info!(resource_id = %resource.id, owner_id = %owner_id, "resource submitted");
    Ok(resource)
}

// ── ListResources ────────────────────────────────────────────────────────────

pub struct ListResourcesUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ListResourcesUseCase<R> {
    pub async fn execute(
        &self,
        mut filter: ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        filter.search = filter
            .search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        filter.tag = filter
            .tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self.repo.list_public(&filter, page).await
    }
}

// ── GetResource ──────────────────────────────────────────────────────────────

pub struct GetResourceUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> GetResourceUseCase<R> {
    pub async fn execute(&self, id: Uuid, actor: Option<Actor>) -> Result<ResourceView, ApiServiceError> {
        let mut resource = find_visible(&self.repo, id, actor).await?;
        self.repo.increment_view(id).await?;
        resource.view_count += 1;
        let link_visible = link_visible(&self.repo, &resource, actor).await?;
        Ok(ResourceView {
            resource,
            link_visible,
        })
    }
}

// ── ListMyResources ──────────────────────────────────────────────────────────

pub struct ListMyResourcesUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ListMyResourcesUseCase<R> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        self.repo.list_by_owner(owner_id, page).await
    }
}

// ── CreateResource ───────────────────────────────────────────────────────────

pub struct CreateResourceUseCase<R, C>
where
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub resources: R,
    pub categories: C,
}

impl<R, C> CreateResourceUseCase<R, C>
where
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub async fn execute(&self, owner_id: Uuid, input: ResourceInput) -> Result<Resource, ApiServiceError> {
        create_resource(&self.resources, &self.categories, owner_id, input).await
    }
}

// ── UpdateResource ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateResourceInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub price_credits: Option<i64>,
}

impl UpdateResourceInput {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.link.is_none()
            && self.category_id.is_none()
            && self.tags.is_none()
            && self.price_credits.is_none()
    }

    fn into_changes(self) -> Result<ResourceChanges, ApiServiceError> {
        if let Some(price) = self.price_credits {
            validate_price(price)?;
        }
        Ok(ResourceChanges {
            title: self.title.as_deref().map(validate_title).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            link: self.link.as_deref().map(validate_link).transpose()?,
            category_id: self.category_id,
            tags: self.tags.as_deref().map(normalize_tags).transpose()?,
            price_credits: self.price_credits,
            status: None,
        })
    }
}

pub struct UpdateResourceUseCase<R, C>
where
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub resources: R,
    pub categories: C,
}

impl<R, C> UpdateResourceUseCase<R, C>
where
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        id: Uuid,
        input: UpdateResourceInput,
    ) -> Result<Resource, ApiServiceError> {
        if input.is_empty() {
            return Err(ApiServiceError::invalid("nothing to update"));
        }
        let current = self
            .resources
            .find(id)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;
        if !actor.can_manage(current.owner_id) {
            return Err(ApiServiceError::Forbidden);
        }

        let mut changes = input.into_changes()?;
        ensure_category(&self.categories, changes.category_id).await?;

        // An owner edit goes back through moderation; an admin fixing someone
        // else's listing does not.
        if actor.user_id == current.owner_id {
            let next = current.status.after_owner_edit();
            if next != current.status {
                changes.status = Some(current.status.transition(next)?);
            }
        }

        let updated = self
            .resources
            .update(id, &changes)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;
        tracing::info!(
            resource_id = %id,
            user_id = %actor.user_id,
            status = %updated.status,
            "resource updated"
        );
        Ok(updated)
    }
}

// ── DeleteResource ───────────────────────────────────────────────────────────

pub struct DeleteResourceUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> DeleteResourceUseCase<R> {
    pub async fn execute(&self, actor: Actor, id: Uuid) -> Result<(), ApiServiceError> {
        let resource = self
            .repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;
        if !actor.can_manage(resource.owner_id) {
            return Err(ApiServiceError::Forbidden);
        }
        if !self.repo.delete(id).await? {
            return Err(ApiServiceError::ResourceNotFound);
        }
        tracing::info!(resource_id = %id, user_id = %actor.user_id, "resource deleted");
        Ok(())
    }
}

// ── VisitResource ────────────────────────────────────────────────────────────

pub struct VisitResourceUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> VisitResourceUseCase<R> {
    /// Returns the link to follow.
    pub async fn execute(&self, id: Uuid, actor: Option<Actor>) -> Result<String, ApiServiceError> {
        let resource = find_visible(&self.repo, id, actor).await?;
        if !link_visible(&self.repo, &resource, actor).await? {
            return Err(ApiServiceError::ResourceLocked);
        }
        self.repo.increment_visit(id).await?;
        Ok(resource.link)
    }
}

// ── CheckLink ────────────────────────────────────────────────────────────────

pub struct CheckLinkUseCase<L: LinkChecker> {
    pub checker: L,
}

impl<L: LinkChecker> CheckLinkUseCase<L> {
    pub async fn execute(&self, url: &str) -> Result<LinkCheck, ApiServiceError> {
        let url = validate_link(url)?;
        Ok(self.checker.check(&url).await)
    }
}
