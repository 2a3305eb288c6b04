use deadpool_redis::Pool;
use deadpool_redis::redis::{
    AsyncCommands, ExistenceCheck, RedisError, Script, SetExpiry, SetOptions,
};
use uuid::Uuid;

use crate::domain::repository::BatchTaskStore;
use crate::domain::types::{BATCH_LEASE_MS, BATCH_TASK_TTL_SECS, BatchTask};
use crate::error::ApiServiceError;

#[derive(Clone)]
pub struct RedisBatchTaskStore {
    pub pool: Pool,
}

fn task_key(id: Uuid) -> String {
    format!("batch_upload:{}", id)
}

fn index_key(user_id: Uuid) -> String {
    format!("batch_upload_index:{}", user_id)
}

fn lease_key(id: Uuid) -> String {
    format!("batch_upload_lock:{}", id)
}

const RELEASE_LEASE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

fn redis_err(e: RedisError) -> ApiServiceError {
    ApiServiceError::Internal(e.into())
}

impl BatchTaskStore for RedisBatchTaskStore {
    async fn save(&self, task: &BatchTask) -> Result<(), ApiServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        let payload =
            serde_json::to_vec(task).map_err(|e| ApiServiceError::Internal(e.into()))?;
        let index = index_key(task.user_id);
        let (): () = conn
            .set_ex(task_key(task.id), payload, BATCH_TASK_TTL_SECS)
            .await
            .map_err(redis_err)?;
        let (): () = conn
            .sadd(&index, task.id.to_string())
            .await
            .map_err(redis_err)?;
        let (): () = conn
            .expire(&index, BATCH_TASK_TTL_SECS as i64)
            .await
            .map_err(redis_err)?;
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<BatchTask>, ApiServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        let value: Option<Vec<u8>> = conn.get(task_key(id)).await.map_err(redis_err)?;
        value
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(|e| ApiServiceError::Internal(e.into()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BatchTask>, ApiServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        let index = index_key(user_id);
        let members: Vec<String> = conn.smembers(&index).await.map_err(redis_err)?;

        let mut tasks = Vec::with_capacity(members.len());
        for member in members {
            let Ok(id) = Uuid::parse_str(&member) else {
                continue;
            };
            let value: Option<Vec<u8>> = conn.get(task_key(id)).await.map_err(redis_err)?;
            match value {
                Some(bytes) => match serde_json::from_slice::<BatchTask>(&bytes) {
                    Ok(task) => tasks.push(task),
                    Err(e) => tracing::warn!(task_id = %id, error = %e, "skipping unreadable batch task"),
                },
                // Task expired; drop it from the index.
                None => {
                    let (): () = conn.srem(&index, &member).await.map_err(redis_err)?;
                }
            }
        }
        Ok(tasks)
    }

    async fn acquire_lease(&self, id: Uuid) -> Result<Option<Uuid>, ApiServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        let token = Uuid::new_v4();
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::PX(BATCH_LEASE_MS));
        let reply: Option<String> = conn
            .set_options(lease_key(id), token.to_string(), options)
            .await
            .map_err(redis_err)?;
        Ok(reply.map(|_| token))
    }

    async fn release_lease(&self, id: Uuid, token: Uuid) -> Result<(), ApiServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ApiServiceError::Internal(e.into()))?;
        let _: i64 = Script::new(RELEASE_LEASE)
            .key(lease_key(id))
            .arg(token.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(redis_err)?;
        Ok(())
    }
}
