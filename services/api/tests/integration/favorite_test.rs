use uuid::Uuid;

use hub_domain::pagination::PageRequest;
use hub_domain::resource::ResourceStatus;

use hub_api::error::ApiServiceError;
use hub_api::usecase::favorite::{
    AddFavoriteUseCase, FavoriteStatusUseCase, ListFavoritesUseCase, RemoveFavoriteUseCase,
};

use crate::helpers::{MockFavoriteRepo, MockResourceRepo, member, test_resource};

#[tokio::test]
async fn should_add_favorite_once_on_repeat_calls() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let resources = MockResourceRepo::new(vec![resource]);
    let favorites = MockFavoriteRepo::new(resources.clone());
    let user = member(Uuid::new_v4());
    let uc = AddFavoriteUseCase {
        favorites: favorites.clone(),
        resources: resources.clone(),
    };

    assert!(uc.execute(user, id).await.unwrap());
    assert!(uc.execute(user, id).await.unwrap());

    assert_eq!(favorites.count(), 1);
    assert_eq!(resources.get(id).unwrap().favorite_count, 1);
}

#[tokio::test]
async fn should_remove_favorite_idempotently() {
    let resource = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let id = resource.id;
    let resources = MockResourceRepo::new(vec![resource]);
    let favorites = MockFavoriteRepo::new(resources.clone());
    let user = Uuid::new_v4();

    AddFavoriteUseCase {
        favorites: favorites.clone(),
        resources: resources.clone(),
    }
    .execute(member(user), id)
    .await
    .unwrap();

    let remove = RemoveFavoriteUseCase {
        favorites: favorites.clone(),
    };
    assert!(!remove.execute(user, id).await.unwrap());
    assert!(!remove.execute(user, id).await.unwrap());
    assert_eq!(resources.get(id).unwrap().favorite_count, 0);

    let status = FavoriteStatusUseCase { favorites };
    assert!(!status.execute(user, id).await.unwrap());
}

#[tokio::test]
async fn should_not_favorite_hidden_resource() {
    let pending = test_resource(Uuid::new_v4(), ResourceStatus::Pending, 0);
    let id = pending.id;
    let resources = MockResourceRepo::new(vec![pending]);
    let favorites = MockFavoriteRepo::new(resources.clone());
    let uc = AddFavoriteUseCase {
        favorites: favorites.clone(),
        resources,
    };

    assert!(matches!(
        uc.execute(member(Uuid::new_v4()), id).await,
        Err(ApiServiceError::ResourceNotFound)
    ));
    assert_eq!(favorites.count(), 0);
}

#[tokio::test]
async fn should_list_own_favorites_only() {
    let a = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let b = test_resource(Uuid::new_v4(), ResourceStatus::Approved, 0);
    let (a_id, b_id) = (a.id, b.id);
    let resources = MockResourceRepo::new(vec![a, b]);
    let favorites = MockFavoriteRepo::new(resources.clone());
    let me = Uuid::new_v4();
    let other = Uuid::new_v4();
    let add = AddFavoriteUseCase {
        favorites: favorites.clone(),
        resources,
    };
    add.execute(member(me), a_id).await.unwrap();
    add.execute(member(me), b_id).await.unwrap();
    add.execute(member(other), a_id).await.unwrap();

    let list = ListFavoritesUseCase { favorites };
    let page = list.execute(me, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(list.execute(other, PageRequest::default()).await.unwrap().total, 1);
}
