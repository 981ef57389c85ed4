//! `StatusStore` — a best-effort KV cache for workflow and batch status.
//!
//! Two key namespaces, both TTL-bounded:
//! - `workflow:status:{workflow_id}` -> serialized `WorkflowStatusRecord`
//! - `batch:{batch_id}` -> serialized `BatchRecord`

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{instrument, warn};
use uuid::Uuid;

use onboard_domain::{BatchRecord, WorkflowStatusRecord};

use crate::error::StatusStoreError;

const DEFAULT_TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct StatusStoreConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub ttl_seconds: u64,
}

impl StatusStoreConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("STATUS_STORE_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("STATUS_STORE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6379);
        let password = std::env::var("STATUS_STORE_PASSWORD").ok();
        let ttl_seconds = std::env::var("STATUS_STORE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        Self {
            host,
            port,
            password,
            ttl_seconds,
        }
    }

    fn connection_url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}:{}", password, self.host, self.port),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }
}

fn workflow_key(workflow_id: Uuid) -> String {
    format!("workflow:status:{workflow_id}")
}

fn batch_key(batch_id: Uuid) -> String {
    format!("batch:{batch_id}")
}

#[derive(Clone)]
pub struct StatusStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl StatusStore {
    pub async fn connect(config: StatusStoreConfig) -> Result<Self, StatusStoreError> {
        let client = redis::Client::open(config.connection_url())
            .map_err(|e| StatusStoreError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            ttl_seconds: config.ttl_seconds,
        })
    }

    pub async fn from_env() -> Result<Self, StatusStoreError> {
        Self::connect(StatusStoreConfig::from_env()).await
    }

    #[instrument(skip(self))]
    pub async fn get_workflow_status(
        &self,
        workflow_id: Uuid,
    ) -> Result<Option<WorkflowStatusRecord>, StatusStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(workflow_key(workflow_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, record))]
    pub async fn set_workflow_status(
        &self,
        workflow_id: Uuid,
        record: &WorkflowStatusRecord,
    ) -> Result<(), StatusStoreError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;
        conn.set_ex::<_, _, ()>(workflow_key(workflow_id), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_workflow_status(&self, workflow_id: Uuid) -> Result<(), StatusStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(workflow_key(workflow_id)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_batch(&self, batch_id: Uuid) -> Result<Option<BatchRecord>, StatusStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(batch_key(batch_id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, record))]
    pub async fn set_batch(
        &self,
        batch_id: Uuid,
        record: &BatchRecord,
    ) -> Result<(), StatusStoreError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;
        conn.set_ex::<_, _, ()>(batch_key(batch_id), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    /// Scan for keys matching a glob pattern (e.g. `"workflow:status:*"`).
    /// Used by batch aggregation tooling that needs to enumerate live
    /// entries rather than look one up by id.
    #[instrument(skip(self))]
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StatusStoreError> {
        use futures::StreamExt;

        let mut conn = self.conn.clone();
        let mut iter: redis::AsyncIter<'_, String> = conn.scan_match(pattern).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Best-effort read: logs and swallows any store error, returning `None`
/// ("unknown") instead of propagating it. Callers on the hot path (the
/// HTTP status handlers) should prefer this over `get_workflow_status`
/// directly so a flaky cache never turns into a 5xx.
pub async fn try_get_workflow_status(
    store: &StatusStore,
    workflow_id: Uuid,
) -> Option<WorkflowStatusRecord> {
    match store.get_workflow_status(workflow_id).await {
        Ok(record) => record,
        Err(err) => {
            warn!(%workflow_id, error = %err, "status store read failed, falling back to engine");
            None
        }
    }
}

/// Best-effort write: logs and swallows any store error. Never propagate
/// a status-store failure as a workflow failure.
pub async fn try_set_workflow_status(
    store: &StatusStore,
    workflow_id: Uuid,
    record: &WorkflowStatusRecord,
) {
    if let Err(err) = store.set_workflow_status(workflow_id, record).await {
        warn!(%workflow_id, error = %err, "status store write failed, continuing");
    }
}
