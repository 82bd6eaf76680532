//! Shared ordered-list store backing the attempt ledger
//!
//! This module defines the store trait and its backends. The ledger only
//! needs five primitives (append, length, indexed read, conditional removal,
//! key-level TTL); any store offering them qualifies. The Redis backend is
//! the intended production target for multi-instance deployments; the
//! in-memory backend serves tests and single-node setups.

pub mod memory;
pub mod redis;

pub use memory::MemoryListStore;
pub use redis::{RedisListStore, RedisStoreConfig};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Ordered-list key-value store trait
///
/// All operations are short, blocking sequences from the caller's point of
/// view; implementations must bound each call with their own deadline so a
/// slow store never hangs the login path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append a serialized record to the ordered collection under `key`
    async fn append(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Current element count under `key` (0 for a missing key)
    async fn len(&self, key: &str) -> Result<u64, StoreError>;

    /// Read one element by position; `None` if the index is out of range
    async fn read_at(&self, key: &str, index: u64) -> Result<Option<String>, StoreError>;

    /// Remove all elements equal to `value`; returns the number removed
    async fn remove(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Set or refresh a time-to-live on the whole key
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
}
