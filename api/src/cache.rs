//! Computed query results keyed by region code, each with a fixed lifetime.

use async_trait::async_trait;
use dashmap::DashMap;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::dto::QueryResult;

const RESULT_KEY_PREFIX: &str = "covid:result:";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cached result is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, region_code: &str) -> Result<Option<QueryResult>, CacheError>;

    async fn set(
        &self,
        region_code: &str,
        result: &QueryResult,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// In-process cache. Expired entries are dropped when read. An entry whose
/// expiry does not fit in an `Instant` never expires.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (Option<Instant>, String)>,
}

fn is_live(expires: Option<Instant>) -> bool {
    expires.is_none_or(|expires| expires > Instant::now())
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, region_code: &str) -> Result<Option<QueryResult>, CacheError> {
        let encoded = match self.entries.get(region_code) {
            Some(entry) if is_live(entry.0) => entry.1.clone(),
            Some(entry) => {
                drop(entry);
                self.entries
                    .remove_if(region_code, |_, (expires, _)| !is_live(*expires));
                return Ok(None);
            }
            None => return Ok(None),
        };

        Ok(Some(serde_json::from_str(&encoded)?))
    }

    async fn set(
        &self,
        region_code: &str,
        result: &QueryResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let encoded = serde_json::to_string(result)?;
        self.entries
            .insert(region_code.to_string(), (Instant::now().checked_add(ttl), encoded));
        Ok(())
    }
}

pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn get(&self, region_code: &str) -> Result<Option<QueryResult>, CacheError> {
        let mut connection = self.connection.clone();
        let encoded: Option<String> = connection
            .get(format!("{RESULT_KEY_PREFIX}{region_code}"))
            .await?;

        match encoded {
            Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        region_code: &str,
        result: &QueryResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let encoded = serde_json::to_string(result)?;
        connection
            .set_ex::<_, _, ()>(
                format!("{RESULT_KEY_PREFIX}{region_code}"),
                encoded,
                ttl.as_secs().max(1),
            )
            .await?;
        Ok(())
    }
}
