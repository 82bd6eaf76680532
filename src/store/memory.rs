//! In-memory implementation of the list store
//!
//! Suitable for tests and single-instance deployments. Key-level TTLs are
//! honored lazily: an expired key is evicted on the next access, which is
//! the same observable behavior the Redis backend provides.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::ListStore;

#[derive(Debug)]
struct Bucket {
    items: Vec<String>,
    /// Key-level expiry; `None` until `expire` is first called
    deadline: Option<Instant>,
}

impl Bucket {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            deadline: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if deadline <= now)
    }
}

/// In-memory list store
#[derive(Debug, Default)]
pub struct MemoryListStore {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict the key if its TTL has lapsed, then run `f` on the map
    async fn with_buckets<T>(&self, key: &str, f: impl FnOnce(&mut HashMap<String, Bucket>) -> T) -> T {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();
        if buckets.get(key).is_some_and(|b| b.is_expired(now)) {
            buckets.remove(key);
        }
        f(&mut buckets)
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn append(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_buckets(key, |buckets| {
            buckets
                .entry(key.to_string())
                .or_insert_with(Bucket::new)
                .items
                .push(value.to_string());
        })
        .await;
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<u64, StoreError> {
        let count = self
            .with_buckets(key, |buckets| {
                buckets.get(key).map(|b| b.items.len()).unwrap_or(0)
            })
            .await;
        Ok(count as u64)
    }

    async fn read_at(&self, key: &str, index: u64) -> Result<Option<String>, StoreError> {
        let value = self
            .with_buckets(key, |buckets| {
                buckets
                    .get(key)
                    .and_then(|b| b.items.get(index as usize).cloned())
            })
            .await;
        Ok(value)
    }

    async fn remove(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let removed = self
            .with_buckets(key, |buckets| {
                let Some(bucket) = buckets.get_mut(key) else {
                    return 0;
                };
                let before = bucket.items.len();
                bucket.items.retain(|item| item != value);
                let removed = before - bucket.items.len();
                if bucket.items.is_empty() {
                    buckets.remove(key);
                }
                removed
            })
            .await;
        Ok(removed as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        self.with_buckets(key, |buckets| {
            if let Some(bucket) = buckets.get_mut(key) {
                bucket.deadline = Some(Instant::now() + ttl);
            }
        })
        .await;
        Ok(())
    }
}
