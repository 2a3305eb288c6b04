use std::time::Instant;

use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::resource::{ResourceStatus, ReviewAction};
use hub_domain::user::Actor;

use crate::domain::repository::{Enricher, ResourceRepository, StatsRepository};
use crate::domain::types::{AdminStats, MAX_TAGS, Resource, validate_tag_name};
use crate::error::ApiServiceError;

const MAX_REJECT_REASON_LEN: usize = 500;
const MAX_AI_SUMMARY_LEN: usize = 1000;

// ── ModerationQueue ──────────────────────────────────────────────────────────

pub struct ModerationQueueUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ModerationQueueUseCase<R> {
    pub async fn execute(
        &self,
        status: Option<ResourceStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        self.repo.list_by_status(status, page).await
    }
}

// ── ReviewResource ───────────────────────────────────────────────────────────

pub struct ReviewInput {
    pub action: ReviewAction,
    pub reason: Option<String>,
}

pub struct ReviewResourceUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ReviewResourceUseCase<R> {
    pub async fn execute(
        &self,
        admin: Actor,
        id: Uuid,
        input: ReviewInput,
    ) -> Result<Resource, ApiServiceError> {
        let mut resource = self
            .repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;
        let next = resource.status.transition(input.action.target())?;

        let reason = match input.action {
            ReviewAction::Approve => None,
            ReviewAction::Reject => input
                .reason
                .map(|r| r.trim().to_owned())
                .filter(|r| !r.is_empty()),
        };
        if reason
            .as_deref()
            .is_some_and(|r| r.chars().count() > MAX_REJECT_REASON_LEN)
        {
            return Err(ApiServiceError::invalid(format!(
                "reason must be at most {MAX_REJECT_REASON_LEN} characters"
            )));
        }

        if !self
            .repo
            .set_status(id, resource.status, next, reason.as_deref())
            .await?
        {
            return Err(ApiServiceError::StateChanged);
        }
        tracing::info!(
            resource_id = %id,
            admin_id = %admin.user_id,
            from = %resource.status,
            to = %next,
            "resource reviewed"
        );
        resource.status = next;
        resource.reject_reason = reason;
        Ok(resource)
    }
}

// ── ToggleTop ────────────────────────────────────────────────────────────────

pub struct ToggleTopUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ToggleTopUseCase<R> {
    /// Flip `is_top` with a compare-and-swap. A concurrent toggle that lands
    /// between our read and write makes this call fail with `StateChanged`.
    pub async fn execute(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let resource = self
            .repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;
        let expected = resource.is_top;
        if !self.repo.set_top_if(id, expected, !expected).await? {
            tracing::debug!(resource_id = %id, "toggle-top lost the race");
            return Err(ApiServiceError::StateChanged);
        }
        Ok(!expected)
    }
}

// ── Stats ────────────────────────────────────────────────────────────────────

pub struct StatsUseCase<S: StatsRepository> {
    pub stats: S,
}

impl<S: StatsRepository> StatsUseCase<S> {
    pub async fn execute(&self) -> Result<AdminStats, ApiServiceError> {
        let started = Instant::now();
        let (
            users,
            pending_resources,
            approved_resources,
            rejected_resources,
            favorites,
            ratings,
            paid_orders,
            revenue_cents,
            credits_in_circulation,
        ) = tokio::try_join!(
            self.stats.count_users(),
            self.stats.count_resources(ResourceStatus::Pending),
            self.stats.count_resources(ResourceStatus::Approved),
            self.stats.count_resources(ResourceStatus::Rejected),
            self.stats.count_favorites(),
            self.stats.count_ratings(),
            self.stats.count_paid_orders(),
            self.stats.revenue_cents(),
            self.stats.credits_in_circulation(),
        )?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(elapsed_ms, "admin stats collected");

        Ok(AdminStats {
            users,
            pending_resources,
            approved_resources,
            rejected_resources,
            favorites,
            ratings,
            paid_orders,
            revenue_cents,
            credits_in_circulation,
            elapsed_ms,
        })
    }
}

// ── EnrichResource ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOutput {
    pub summary: String,
    pub score: i32,
    pub suggested_tags: Vec<String>,
}

pub struct EnrichResourceUseCase<R, E>
where
    R: ResourceRepository,
    E: Enricher,
{
    pub repo: R,
    /// `None` when no LLM endpoint is configured.
    pub enricher: Option<E>,
}

impl<R, E> EnrichResourceUseCase<R, E>
where
    R: ResourceRepository,
    E: Enricher,
{
    pub async fn execute(&self, id: Uuid) -> Result<EnrichOutput, ApiServiceError> {
        let enricher = self
            .enricher
            .as_ref()
            .ok_or(ApiServiceError::EnrichmentDisabled)?;
        let resource = self
            .repo
            .find(id)
            .await?
            .ok_or(ApiServiceError::ResourceNotFound)?;

        let enrichment = enricher.enrich(&resource).await?;
        let summary: String = enrichment
            .summary
            .trim()
            .chars()
            .take(MAX_AI_SUMMARY_LEN)
            .collect();
        let score = clamp_score(enrichment.score);
        let mut suggested_tags: Vec<String> = Vec::new();
        for tag in enrichment.tags.iter().filter_map(|t| validate_tag_name(t).ok()) {
            if suggested_tags.len() < MAX_TAGS && !suggested_tags.contains(&tag) {
                suggested_tags.push(tag);
            }
        }

        self.repo.set_enrichment(id, &summary, score).await?;
        tracing::info!(resource_id = %id, score, "resource enriched");
        Ok(EnrichOutput {
            summary,
            score,
            suggested_tags,
        })
    }
}

fn clamp_score(raw: f64) -> i32 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as i32
}
