//! Redis implementation of the list store
//!
//! Backs the attempt ledger with a shared Redis instance so multiple server
//! instances see the same buckets. Every command is bounded by the configured
//! per-operation deadline; a deadline expiry surfaces as `StoreError::Timeout`
//! and is absorbed by the ledger's fail-open policy like any other store
//! error.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::StoreError;

use super::ListStore;

/// Configuration for the Redis list store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL
    pub url: String,

    /// Deadline applied to each individual command
    pub op_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            op_timeout: Duration::from_secs(2),
        }
    }
}

/// Redis-backed list store
///
/// Holds a managed connection that reconnects on failure; clones of the
/// manager share the underlying connection.
pub struct RedisListStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisListStore {
    /// Connect to Redis with the given configuration
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            conn,
            op_timeout: config.op_timeout,
        })
    }

    /// Run a command under the per-operation deadline
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(StoreError::Unavailable(err.to_string())),
            Err(_) => Err(StoreError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn append(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.rpush::<_, _, i64>(key, value)).await?;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.llen::<_, u64>(key)).await
    }

    async fn read_at(&self, key: &str, index: u64) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.lindex::<_, Option<String>>(key, index as isize))
            .await
    }

    async fn remove(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        // count 0 removes every element equal to value
        self.bounded(conn.lrem::<_, _, u64>(key, 0, value)).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.expire::<_, bool>(key, ttl.as_secs() as i64))
            .await?;
        Ok(())
    }
}
