use uuid::Uuid;

use hub_domain::pagination::PageRequest;
use hub_domain::resource::ResourceStatus;

use hub_api::domain::types::ResourceFilter;
use hub_api::error::ApiServiceError;
use hub_api::usecase::resource::{
    CreateResourceUseCase, DeleteResourceUseCase, GetResourceUseCase, ListResourcesUseCase,
    UpdateResourceInput, UpdateResourceUseCase, VisitResourceUseCase,
};

use crate::helpers::{
    MockCategoryRepo, MockResourceRepo, admin, member, resource_input, test_resource,
};

// ── Visibility ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_pending_resource_from_strangers() {
    let owner = Uuid::new_v4();
    let pending = test_resource(owner, ResourceStatus::Pending, 0);
    let id = pending.id;
    let uc = GetResourceUseCase {
        repo: MockResourceRepo::new(vec![pending]),
    };

    assert!(matches!(
        uc.execute(id, None).await,
        Err(ApiServiceError::ResourceNotFound)
    ));
    assert!(matches!(
        uc.execute(id, Some(member(Uuid::new_v4()))).await,
        Err(ApiServiceError::ResourceNotFound)
    ));

    let own = uc.execute(id, Some(member(owner))).await.unwrap();
    assert_eq!(own.resource.status, ResourceStatus::Pending);
    assert!(uc.execute(id, Some(admin())).await.is_ok());
}

#[tokio::test]
async fn should_count_views_on_get() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let repo = MockResourceRepo::new(vec![resource]);
    let uc = GetResourceUseCase { repo: repo.clone() };

    let view = uc.execute(id, None).await.unwrap();
    assert_eq!(view.resource.view_count, 1);
    uc.execute(id, None).await.unwrap();
    assert_eq!(repo.get(id).unwrap().view_count, 2);
}

#[tokio::test]
async fn should_show_paid_link_only_to_manager_and_buyer() {
    let owner = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let paid = test_resource(owner, ResourceStatus::Approved, 30);
    let id = paid.id;
    let repo = MockResourceRepo::new(vec![paid]);
    repo.grant_unlock(buyer, id);
    let uc = GetResourceUseCase { repo };

    assert!(!uc.execute(id, None).await.unwrap().link_visible);
    assert!(!uc.execute(id, Some(member(Uuid::new_v4()))).await.unwrap().link_visible);
    assert!(uc.execute(id, Some(member(buyer))).await.unwrap().link_visible);
    assert!(uc.execute(id, Some(member(owner))).await.unwrap().link_visible);
    assert!(uc.execute(id, Some(admin())).await.unwrap().link_visible);
}

#[tokio::test]
async fn should_refuse_visit_of_locked_resource() {
    let paid = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 30);
    let free = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let (paid_id, free_id) = (paid.id, free.id);
    let repo = MockResourceRepo::new(vec![paid, free]);
    let uc = VisitResourceUseCase { repo: repo.clone() };

    assert!(matches!(
        uc.execute(paid_id, None).await,
        Err(ApiServiceError::ResourceLocked)
    ));
    assert_eq!(repo.get(paid_id).unwrap().visit_count, 0);

    let link = uc.execute(free_id, None).await.unwrap();
    assert_eq!(link, "https://example.com/async-book");
    assert_eq!(repo.get(free_id).unwrap().visit_count, 1);
}

#[tokio::test]
async fn should_list_only_approved_resources_pinned_first() {
    let owner = Uuid::new_v4();
    let mut pinned = test_resource(owner, ResourceStatus::Approved, 0);
    pinned.is_top = true;
    let pinned_id = pinned.id;
    let repo = MockResourceRepo::new(vec![
        test_resource(owner, ResourceStatus::Approved, 0),
        test_resource(owner, ResourceStatus::Pending, 0),
        test_resource(owner, ResourceStatus::Rejected, 0),
        pinned,
    ]);
    let uc = ListResourcesUseCase { repo };

    let page = uc
        .execute(ResourceFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, pinned_id);
    assert!(page.items.iter().all(|r| r.status == ResourceStatus::Approved));
}

// ── Create / update / delete ─────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_resource_with_normalized_tags() {
    let repo = MockResourceRepo::default();
    let uc = CreateResourceUseCase {
        resources: repo.clone(),
        categories: MockCategoryRepo::default(),
    };
    let owner = Uuid::new_v4();

    let mut input = resource_input("Tokio guide");
    input.tags = vec!["Async".into(), "async ".into(), "Tokio".into()];
    let created = uc.execute(owner, input).await.unwrap();

    assert_eq!(created.status, ResourceStatus::Pending);
    assert_eq!(created.tags, vec!["async".to_owned(), "tokio".to_owned()]);
    assert_eq!(repo.count(), 1);
}

#[tokio::test]
async fn should_reject_unknown_category_on_create() {
    let uc = CreateResourceUseCase {
        resources: MockResourceRepo::default(),
        categories: MockCategoryRepo::default(),
    };
    let mut input = resource_input("Orphan");
    input.category_id = Some(Uuid::new_v4());

    assert!(matches!(
        uc.execute(Uuid::new_v4(), input).await,
        Err(ApiServiceError::CategoryNotFound)
    ));
}

#[tokio::test]
async fn should_send_owner_edit_back_to_moderation() {
    let owner = Uuid::new_v4();
    let approved = test_resource(owner, ResourceStatus::Approved, 0);
    let id = approved.id;
    let uc = UpdateResourceUseCase {
        resources: MockResourceRepo::new(vec![approved]),
        categories: MockCategoryRepo::default(),
    };

    let updated = uc
        .execute(
            member(owner),
            id,
            UpdateResourceInput {
                title: Some("Rust async book, 2nd edition".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ResourceStatus::Pending);
    assert_eq!(updated.title, "Rust async book, 2nd edition");
}

#[tokio::test]
async fn should_keep_status_on_admin_edit() {
    let approved = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = approved.id;
    let uc = UpdateResourceUseCase {
        resources: MockResourceRepo::new(vec![approved]),
        categories: MockCategoryRepo::default(),
    };

    let updated = uc
        .execute(
            admin(),
            id,
            UpdateResourceInput {
                price_credits: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ResourceStatus::Approved);
    assert_eq!(updated.price_credits, 5);
}

#[tokio::test]
async fn should_forbid_editing_someone_elses_resource() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let repo = MockResourceRepo::new(vec![resource]);
    let stranger = member(Uuid::new_v4());

    let update = UpdateResourceUseCase {
        resources: repo.clone(),
        categories: MockCategoryRepo::default(),
    };
    assert!(matches!(
        update
            .execute(
                stranger,
                id,
                UpdateResourceInput {
                    title: Some("mine now".into()),
                    ..Default::default()
                },
            )
            .await,
        Err(ApiServiceError::Forbidden)
    ));

    let delete = DeleteResourceUseCase { repo: repo.clone() };
    assert!(matches!(
        delete.execute(stranger, id).await,
        Err(ApiServiceError::Forbidden)
    ));
    assert_eq!(repo.count(), 1);

    delete.execute(admin(), id).await.unwrap();
    assert_eq!(repo.count(), 0);
}
