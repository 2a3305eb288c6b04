use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{BatchTaskStore, CategoryRepository, ResourceRepository};
use crate::domain::types::{BatchFailure, BatchStatus, BatchTask, MAX_BATCH_ITEMS, ResourceInput};
use crate::error::ApiServiceError;
use crate::usecase::resource::create_resource;

/// Process items from `task.processed` onward, checkpointing after each one.
///
/// Validation failures are recorded per item and processing continues. A
/// server-side failure stops the run with the task still `running`, so a
/// later resume picks up at the failed item. Callers hold the task's lease.
async fn run_task<S, R, C>(
    store: &S,
    resources: &R,
    categories: &C,
    mut task: BatchTask,
) -> Result<BatchTask, ApiServiceError>
where
    S: BatchTaskStore,
    R: ResourceRepository,
    C: CategoryRepository,
{
    while task.processed < task.total {
        let index = task.processed;
        let Some(item) = task.items.get(index).cloned() else {
            tracing::error!(
                task_id = %task.id,
                index,
                items = task.items.len(),
                "batch task cursor is past its items"
            );
            task.status = BatchStatus::Failed;
            task.updated_at = Utc::now();
            store.save(&task).await?;
            return Ok(task);
        };
        match create_resource(resources, categories, task.user_id, item).await {
            Ok(resource) => {
                task.succeeded += 1;
                task.created_ids.push(resource.id);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(task_id = %task.id, index, error = %e, "batch upload interrupted");
                return Err(e);
            }
            Err(e) => task.failed.push(BatchFailure {
                index,
                message: e.to_string(),
            }),
        }
        task.processed += 1;
        task.updated_at = Utc::now();
        store.save(&task).await?;
    }

    task.status = BatchStatus::Completed;
    task.updated_at = Utc::now();
    store.save(&task).await?;
    tracing::info!(
        task_id = %task.id,
        succeeded = task.succeeded,
        failed = task.failed.len(),
        "batch upload completed"
    );
    Ok(task)
}

async fn release<S: BatchTaskStore>(store: &S, task_id: Uuid, lease: Uuid) {
    if let Err(e) = store.release_lease(task_id, lease).await {
        tracing::warn!(task_id = %task_id, error = %e, "batch lease not released; it will expire");
    }
}

async fn load_owned<S: BatchTaskStore>(
    store: &S,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<BatchTask, ApiServiceError> {
    let task = store
        .load(task_id)
        .await?
        .ok_or(ApiServiceError::BatchTaskNotFound)?;
    if task.user_id != user_id {
        return Err(ApiServiceError::Forbidden);
    }
    Ok(task)
}

// ── StartBatch ───────────────────────────────────────────────────────────────

pub struct StartBatchUseCase<S, R, C>
where
    S: BatchTaskStore,
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub store: S,
    pub resources: R,
    pub categories: C,
}

impl<S, R, C> StartBatchUseCase<S, R, C>
where
    S: BatchTaskStore,
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        items: Vec<ResourceInput>,
    ) -> Result<BatchTask, ApiServiceError> {
        if items.is_empty() || items.len() > MAX_BATCH_ITEMS {
            return Err(ApiServiceError::invalid(format!(
                "items must contain 1-{MAX_BATCH_ITEMS} entries"
            )));
        }
        let task = BatchTask::new(user_id, items);
        let task_id = task.id;
        let lease = self
            .store
            .acquire_lease(task_id)
            .await?
            .ok_or(ApiServiceError::StateChanged)?;
        let result: Result<BatchTask, ApiServiceError> = async {
            self.store.save(&task).await?;
            tracing::info!(task_id = %task.id, user_id = %user_id, total = task.total, "batch upload started");
            run_task(&self.store, &self.resources, &self.categories, task).await
        }
        .await;
        release(&self.store, task_id, lease).await;
        result
    }
}

// ── ResumeBatch ──────────────────────────────────────────────────────────────

pub struct ResumeBatchUseCase<S, R, C>
where
    S: BatchTaskStore,
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub store: S,
    pub resources: R,
    pub categories: C,
}

impl<S, R, C> ResumeBatchUseCase<S, R, C>
where
    S: BatchTaskStore,
    R: ResourceRepository,
    C: CategoryRepository,
{
    pub async fn execute(&self, user_id: Uuid, task_id: Uuid) -> Result<BatchTask, ApiServiceError> {
        let task = load_owned(&self.store, user_id, task_id).await?;
        if task.status != BatchStatus::Running {
            return Ok(task);
        }
        let Some(lease) = self.store.acquire_lease(task_id).await? else {
            tracing::info!(task_id = %task_id, "batch upload already being processed");
            return Err(ApiServiceError::StateChanged);
        };
        // The run that held the lease may have moved the cursor since the load.
        let result = match self.store.load(task_id).await {
            Ok(Some(task)) if task.status == BatchStatus::Running => {
                tracing::info!(task_id = %task.id, processed = task.processed, "batch upload resumed");
                run_task(&self.store, &self.resources, &self.categories, task).await
            }
            Ok(Some(task)) => Ok(task),
            Ok(None) => Err(ApiServiceError::BatchTaskNotFound),
            Err(e) => Err(e),
        };
        release(&self.store, task_id, lease).await;
        result
    }
}

// ── GetBatch / ListBatches ───────────────────────────────────────────────────

pub struct GetBatchUseCase<S: BatchTaskStore> {
    pub store: S,
}

impl<S: BatchTaskStore> GetBatchUseCase<S> {
    pub async fn execute(&self, user_id: Uuid, task_id: Uuid) -> Result<BatchTask, ApiServiceError> {
        load_owned(&self.store, user_id, task_id).await
    }
}

pub struct ListBatchesUseCase<S: BatchTaskStore> {
    pub store: S,
}

impl<S: BatchTaskStore> ListBatchesUseCase<S> {
    /// Newest first.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<BatchTask>, ApiServiceError> {
        let mut tasks = self.store.list_for_user(user_id).await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }
}
