use uuid::Uuid;

use hub_api::error::ApiServiceError;
use hub_api::usecase::category::{
    CategoryListing, CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase,
    GetCategoryUseCase, ListCategoriesUseCase, UpdateCategoryInput, UpdateCategoryUseCase,
};

use crate::helpers::MockCategoryRepo;

fn input(name: &str, parent_id: Option<Uuid>, sort_order: i32) -> CreateCategoryInput {
    CreateCategoryInput {
        name: name.into(),
        description: Some("  ".into()),
        parent_id,
        sort_order: Some(sort_order),
    }
}

#[tokio::test]
async fn should_round_trip_a_category_hierarchy() {
    let repo = MockCategoryRepo::default();
    let create = CreateCategoryUseCase { repo: repo.clone() };

    let design = create.execute(input(" Design ", None, 1)).await.unwrap();
    assert_eq!(design.name, "Design");
    assert_eq!(design.description, None);
    let icons = create.execute(input("Icons", Some(design.id), 0)).await.unwrap();
    let code = create.execute(input("Code", None, 0)).await.unwrap();

    let list = ListCategoriesUseCase { repo: repo.clone() };
    let CategoryListing::Tree(tree) = list.execute(true).await.unwrap() else {
        panic!("expected tree listing");
    };
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].category.id, code.id);
    assert_eq!(tree[1].category.id, design.id);
    assert_eq!(tree[1].children[0].category.id, icons.id);

    let update = UpdateCategoryUseCase { repo: repo.clone() };
    let moved = update
        .execute(
            icons.id,
            UpdateCategoryInput {
                name: Some("Icon sets".into()),
                clear_parent: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);

    let fetched = GetCategoryUseCase { repo: repo.clone() }
        .execute(icons.id)
        .await
        .unwrap();
    assert_eq!(fetched.name, "Icon sets");
    let CategoryListing::Flat(flat) = list.execute(false).await.unwrap() else {
        panic!("expected flat listing");
    };
    assert_eq!(flat.len(), 3);
}

#[tokio::test]
async fn should_fetch_what_was_created() {
    let repo = MockCategoryRepo::default();
    let created = CreateCategoryUseCase { repo: repo.clone() }
        .execute(CreateCategoryInput {
            name: "Design".into(),
            description: Some("UI kits, icons and fonts".into()),
            parent_id: None,
            sort_order: None,
        })
        .await
        .unwrap();

    let fetched = GetCategoryUseCase { repo }.execute(created.id).await.unwrap();
    assert_eq!(fetched.name, "Design");
    assert_eq!(fetched.description.as_deref(), Some("UI kits, icons and fonts"));
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn should_refuse_duplicate_names() {
    let repo = MockCategoryRepo::default();
    let create = CreateCategoryUseCase { repo };
    create.execute(input("Design", None, 0)).await.unwrap();
    assert!(matches!(
        create.execute(input("Design", None, 0)).await,
        Err(ApiServiceError::Duplicate("category"))
    ));
}

#[tokio::test]
async fn should_delete_only_empty_leaf_categories() {
    let repo = MockCategoryRepo::default();
    let create = CreateCategoryUseCase { repo: repo.clone() };
    let parent = create.execute(input("Docs", None, 0)).await.unwrap();
    let child = create.execute(input("Guides", Some(parent.id), 0)).await.unwrap();
    repo.resources_per_category
        .lock()
        .unwrap()
        .insert(child.id, 3);

    let delete = DeleteCategoryUseCase { repo: repo.clone() };
    assert!(matches!(
        delete.execute(parent.id).await,
        Err(ApiServiceError::CategoryInUse)
    ));
    assert!(matches!(
        delete.execute(child.id).await,
        Err(ApiServiceError::CategoryInUse)
    ));

    repo.resources_per_category.lock().unwrap().clear();
    delete.execute(child.id).await.unwrap();
    delete.execute(parent.id).await.unwrap();
    assert!(matches!(
        delete.execute(parent.id).await,
        Err(ApiServiceError::CategoryNotFound)
    ));
}
