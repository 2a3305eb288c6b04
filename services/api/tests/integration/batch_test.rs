use uuid::Uuid;

use hub_api::domain::types::{BatchStatus, BatchTask};
use hub_api::error::ApiServiceError;
use hub_api::usecase::batch::{
    GetBatchUseCase, ListBatchesUseCase, ResumeBatchUseCase, StartBatchUseCase,
};

use crate::helpers::{MockBatchStore, MockCategoryRepo, MockResourceRepo, resource_input};

fn start(
    store: &MockBatchStore,
    resources: &MockResourceRepo,
) -> StartBatchUseCase<MockBatchStore, MockResourceRepo, MockCategoryRepo> {
    StartBatchUseCase {
        store: store.clone(),
        resources: resources.clone(),
        categories: MockCategoryRepo::default(),
    }
}

fn resume(
    store: &MockBatchStore,
    resources: &MockResourceRepo,
) -> ResumeBatchUseCase<MockBatchStore, MockResourceRepo, MockCategoryRepo> {
    ResumeBatchUseCase {
        store: store.clone(),
        resources: resources.clone(),
        categories: MockCategoryRepo::default(),
    }
}

#[tokio::test]
async fn should_record_invalid_items_and_continue() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let user = Uuid::new_v4();

    let mut bad = resource_input("broken");
    bad.link = "not a url".into();
    let items = vec![resource_input("first"), bad, resource_input("third")];

    let task = start(&store, &resources).execute(user, items).await.unwrap();

    assert_eq!(task.status, BatchStatus::Completed);
    assert_eq!(task.processed, 3);
    assert_eq!(task.succeeded, 2);
    assert_eq!(task.failed.len(), 1);
    assert_eq!(task.failed[0].index, 1);
    assert_eq!(task.created_ids.len(), 2);
    assert_eq!(resources.count(), 2);
    assert_eq!(store.get(task.id).unwrap(), task);
}

#[tokio::test]
async fn should_resume_from_the_interrupted_item() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    *resources.fail_create_at.lock().unwrap() = Some(2);
    let user = Uuid::new_v4();
    let items: Vec<_> = (0..5).map(|i| resource_input(&format!("item {i}"))).collect();

    let err = start(&store, &resources)
        .execute(user, items)
        .await
        .unwrap_err();
    assert!(err.is_server_error());

    let interrupted = store.only_task();
    assert_eq!(interrupted.status, BatchStatus::Running);
    assert_eq!(interrupted.processed, 2);
    assert_eq!(interrupted.succeeded, 2);
    assert_eq!(resources.count(), 2);

    let done = resume(&store, &resources)
        .execute(user, interrupted.id)
        .await
        .unwrap();
    assert_eq!(done.status, BatchStatus::Completed);
    assert_eq!(done.processed, 5);
    assert_eq!(done.succeeded, 5);
    assert!(done.failed.is_empty());
    assert_eq!(done.created_ids.len(), 5);
    assert_eq!(resources.count(), 5);
}

#[tokio::test]
async fn should_not_rerun_completed_task() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let user = Uuid::new_v4();
    let task = start(&store, &resources)
        .execute(user, vec![resource_input("only")])
        .await
        .unwrap();

    let again = resume(&store, &resources).execute(user, task.id).await.unwrap();
    assert_eq!(again, task);
    assert_eq!(resources.count(), 1);
}

#[tokio::test]
async fn should_keep_tasks_private_to_their_owner() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let task = start(&store, &resources)
        .execute(owner, vec![resource_input("mine")])
        .await
        .unwrap();

    let get = GetBatchUseCase {
        store: store.clone(),
    };
    assert!(matches!(
        get.execute(stranger, task.id).await,
        Err(ApiServiceError::Forbidden)
    ));
    assert!(matches!(
        resume(&store, &resources).execute(stranger, task.id).await,
        Err(ApiServiceError::Forbidden)
    ));
    assert!(matches!(
        get.execute(owner, Uuid::new_v4()).await,
        Err(ApiServiceError::BatchTaskNotFound)
    ));

    let list = ListBatchesUseCase { store };
    assert_eq!(list.execute(owner).await.unwrap().len(), 1);
    assert!(list.execute(stranger).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_empty_or_oversized_batches() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let uc = start(&store, &resources);

    assert!(matches!(
        uc.execute(Uuid::new_v4(), vec![]).await,
        Err(ApiServiceError::InvalidParams(_))
    ));
    let too_many: Vec<_> = (0..51).map(|i| resource_input(&format!("r{i}"))).collect();
    assert!(matches!(
        uc.execute(Uuid::new_v4(), too_many).await,
        Err(ApiServiceError::InvalidParams(_))
    ));
    assert!(store.tasks.lock().unwrap().is_empty());
}

fn running_task(store: &MockBatchStore, user: Uuid, n: usize) -> BatchTask {
    let items = (0..n).map(|i| resource_input(&format!("queued {i}"))).collect();
    let task = BatchTask::new(user, items);
    store.tasks.lock().unwrap().insert(task.id, task.clone());
    task
}

#[tokio::test]
async fn should_let_only_one_of_two_concurrent_resumes_run() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let user = Uuid::new_v4();
    let task = running_task(&store, user, 3);

    let (a, b) = tokio::join!(
        resume(&store, &resources).execute(user, task.id),
        resume(&store, &resources).execute(user, task.id),
    );

    let (done, refused) = match (a, b) {
        (Ok(done), Err(e)) | (Err(e), Ok(done)) => (done, e),
        (a, b) => panic!("expected exactly one resume to run, got {a:?} and {b:?}"),
    };
    assert!(matches!(refused, ApiServiceError::StateChanged));
    assert_eq!(done.status, BatchStatus::Completed);
    assert_eq!(done.succeeded, 3);
    assert_eq!(resources.count(), 3);
    assert!(store.leases.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_refuse_resume_while_lease_is_held() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let user = Uuid::new_v4();
    let task = running_task(&store, user, 2);
    store.leases.lock().unwrap().insert(task.id, Uuid::new_v4());

    assert!(matches!(
        resume(&store, &resources).execute(user, task.id).await,
        Err(ApiServiceError::StateChanged)
    ));
    assert_eq!(resources.count(), 0);
    assert_eq!(store.get(task.id).unwrap().processed, 0);
}

#[tokio::test]
async fn should_fail_task_whose_cursor_outruns_its_items() {
    let store = MockBatchStore::default();
    let resources = MockResourceRepo::default();
    let user = Uuid::new_v4();
    let mut task = running_task(&store, user, 1);
    task.total = 4;
    task.processed = 1;
    store.tasks.lock().unwrap().insert(task.id, task.clone());

    let out = resume(&store, &resources).execute(user, task.id).await.unwrap();
    assert_eq!(out.status, BatchStatus::Failed);
    assert_eq!(out.processed, 1);
    assert_eq!(resources.count(), 0);

    // Terminal: a second resume returns it untouched.
    let again = resume(&store, &resources).execute(user, task.id).await.unwrap();
    assert_eq!(again, out);
}
