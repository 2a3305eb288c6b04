use std::sync::atomic::Ordering;

use uuid::Uuid;

use hub_domain::resource::{ResourceStatus, ReviewAction};

use hub_api::domain::repository::Enricher;
use hub_api::domain::types::{Enrichment, Resource};
use hub_api::error::ApiServiceError;
use hub_api::usecase::admin::{
    EnrichResourceUseCase, ReviewInput, ReviewResourceUseCase, ToggleTopUseCase,
};

use crate::helpers::{MockResourceRepo, admin, test_resource};

// ── ToggleTop ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_toggle_top_flag_back_and_forth() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let repo = MockResourceRepo::new(vec![resource]);
    let uc = ToggleTopUseCase { repo: repo.clone() };

    assert!(uc.execute(id).await.unwrap());
    assert!(repo.get(id).unwrap().is_top);
    assert!(!uc.execute(id).await.unwrap());
    assert!(!repo.get(id).unwrap().is_top);
}

#[tokio::test]
async fn should_fail_toggle_when_flag_changed_concurrently() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let repo = MockResourceRepo::new(vec![resource]);
    repo.flip_top_after_find.store(true, Ordering::SeqCst);
    let uc = ToggleTopUseCase { repo: repo.clone() };

    assert!(matches!(
        uc.execute(id).await,
        Err(ApiServiceError::StateChanged)
    ));
    // The concurrent writer's value survives.
    assert!(repo.get(id).unwrap().is_top);
}

#[tokio::test]
async fn should_report_missing_resource_on_toggle() {
    let uc = ToggleTopUseCase {
        repo: MockResourceRepo::default(),
    };
    assert!(matches!(
        uc.execute(Uuid::new_v4()).await,
        Err(ApiServiceError::ResourceNotFound)
    ));
}

// ── Review ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_approve_pending_resource_once() {
    let pending = test_resource(Uuid::new_v4(), ResourceStatus::Pending, 0);
    let id = pending.id;
    let repo = MockResourceRepo::new(vec![pending]);
    let uc = ReviewResourceUseCase { repo: repo.clone() };
    let approve = || ReviewInput {
        action: ReviewAction::Approve,
        reason: Some("ignored".into()),
    };

    let approved = uc.execute(admin(), id, approve()).await.unwrap();
    assert_eq!(approved.status, ResourceStatus::Approved);
    assert_eq!(approved.reject_reason, None);
    assert_eq!(repo.get(id).unwrap().status, ResourceStatus::Approved);

    assert!(matches!(
        uc.execute(admin(), id, approve()).await,
        Err(ApiServiceError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn should_store_trimmed_reject_reason() {
    let pending = test_resource(Uuid::new_v4(), ResourceStatus::Pending, 0);
    let id = pending.id;
    let repo = MockResourceRepo::new(vec![pending]);
    let uc = ReviewResourceUseCase { repo: repo.clone() };

    let rejected = uc
        .execute(
            admin(),
            id,
            ReviewInput {
                action: ReviewAction::Reject,
                reason: Some("  broken link  ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ResourceStatus::Rejected);
    assert_eq!(
        repo.get(id).unwrap().reject_reason.as_deref(),
        Some("broken link")
    );
}

// ── Enrich ───────────────────────────────────────────────────────────────────

struct CannedEnricher(Enrichment);

impl Enricher for CannedEnricher {
    async fn enrich(&self, _resource: &Resource) -> Result<Enrichment, ApiServiceError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn should_store_clamped_enrichment() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let repo = MockResourceRepo::new(vec![resource]);
    let uc = EnrichResourceUseCase {
        repo: repo.clone(),
        enricher: Some(CannedEnricher(Enrichment {
            summary: "  A practical guide to async Rust. ".into(),
            tags: vec!["Rust".into(), "rust".into(), "".into(), "Async".into()],
            score: 131.4,
        })),
    };

    let out = uc.execute(id).await.unwrap();
    assert_eq!(out.summary, "A practical guide to async Rust.");
    assert_eq!(out.score, 100);
    assert_eq!(out.suggested_tags, vec!["rust".to_owned(), "async".to_owned()]);

    let stored = repo.get(id).unwrap();
    assert_eq!(stored.ai_score, Some(100));
    assert_eq!(stored.ai_summary.as_deref(), Some("A practical guide to async Rust."));
}

#[tokio::test]
async fn should_refuse_enrichment_without_llm() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let uc: EnrichResourceUseCase<_, CannedEnricher> = EnrichResourceUseCase {
        repo: MockResourceRepo::new(vec![resource]),
        enricher: None,
    };
    assert!(matches!(
        uc.execute(id).await,
        Err(ApiServiceError::EnrichmentDisabled)
    ));
}
