//! Snapshot storage. Holds one current snapshot; a refresh swaps it whole.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{Snapshot, SnapshotId};

const SNAPSHOT_KEY_PREFIX: &str = "covid:snapshot:";
const CURRENT_SNAPSHOT_KEY: &str = "covid:snapshot:current";
/// How long a replaced snapshot stays readable for queries that already
/// resolved the old pointer.
const RETIRED_SNAPSHOT_TTL_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot store error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("stored snapshot is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Stores `document` under a fresh identifier and makes it current.
    async fn replace(&self, document: Map<String, Value>) -> Result<SnapshotId, StoreError>;

    /// The current snapshot, `None` before the first refresh.
    async fn read_current(&self) -> Result<Option<Arc<Snapshot>>, StoreError>;
}

#[derive(Default)]
pub struct MemorySnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn replace(&self, document: Map<String, Value>) -> Result<SnapshotId, StoreError> {
        let id = SnapshotId::generate(Utc::now());
        let snapshot = Arc::new(Snapshot::stored(&id, document));
        *self.current.write().await = Some(snapshot);
        Ok(id)
    }

    async fn read_current(&self) -> Result<Option<Arc<Snapshot>>, StoreError> {
        Ok(self.current.read().await.clone())
    }
}

pub struct RedisSnapshotStore {
    connection: ConnectionManager,
}

impl RedisSnapshotStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

fn snapshot_key(id: &str) -> String {
    format!("{SNAPSHOT_KEY_PREFIX}{id}")
}

/// Writes the snapshot and flips the pointer in one MULTI/EXEC. `SET ... GET`
/// hands back the pointer it replaced, so concurrent refreshes each retire a
/// distinct predecessor. Needs Redis 6.2 or newer.
fn swap_pipeline(id: &SnapshotId, encoded: String) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .set(snapshot_key(id.as_str()), encoded)
        .ignore()
        .cmd("SET")
        .arg(CURRENT_SNAPSHOT_KEY)
        .arg(id.as_str())
        .arg("GET");
    pipe
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn replace(&self, document: Map<String, Value>) -> Result<SnapshotId, StoreError> {
        let mut connection = self.connection.clone();
        let id = SnapshotId::generate(Utc::now());
        let encoded = serde_json::to_string(&Snapshot::stored(&id, document))?;

        let (previous,): (Option<String>,) = swap_pipeline(&id, encoded)
            .query_async(&mut connection)
            .await?;

        if let Some(previous) = previous.filter(|previous| previous != id.as_str()) {
            if let Err(e) = connection
                .expire::<_, ()>(snapshot_key(&previous), RETIRED_SNAPSHOT_TTL_SECS)
                .await
            {
                warn!("Failed to retire snapshot {previous}: {e}");
            }
        }

        Ok(id)
    }

    async fn read_current(&self) -> Result<Option<Arc<Snapshot>>, StoreError> {
        let mut connection = self.connection.clone();

        let Some(id) = connection
            .get::<_, Option<String>>(CURRENT_SNAPSHOT_KEY)
            .await?
        else {
            return Ok(None);
        };
        let Some(encoded) = connection
            .get::<_, Option<String>>(snapshot_key(&id))
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Arc::new(serde_json::from_str(&encoded)?)))
    }
}
