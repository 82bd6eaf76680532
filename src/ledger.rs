//! Distributed failed-login attempt ledger
//!
//! Records failed login attempts per identity in the shared store, decides
//! whether an identity has exhausted its attempt budget, and lazily prunes
//! expired records. This is a fixed-window counter with per-identity
//! key-level expiry: when a bucket's TTL lapses the whole history for that
//! identity resets, even for entries inserted moments before expiry. That
//! reset semantic is a deliberate policy choice, not an accident.
//!
//! Store trouble never blocks a login on its own: any store error or deadline
//! expiry observed before a decision makes the operation fail open (permit
//! the attempt, log it, bump a counter so operators can tell the limiter is
//! running blind).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::FailedAttempt;
use crate::otel::Metrics;
use crate::store::ListStore;

/// Configuration for the attempt ledger
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Attempt budget per identity per window
    pub max_attempts: u32,

    /// Length of the counting window; also the bucket's key-level TTL
    pub window: Duration,

    /// Suffix appended to the identity to derive the bucket key
    pub key_suffix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(3600),
            key_suffix: "-login".to_string(),
        }
    }
}

/// Outcome of recording a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The attempt was recorded (or permitted under the fail-open policy)
    Allowed,

    /// The identity's bucket is at capacity; nothing was recorded
    RateLimited,
}

/// Failed-login attempt ledger over a shared list store
pub struct AttemptLedger {
    store: Arc<dyn ListStore>,
    config: LedgerConfig,
    metrics: Option<Arc<Metrics>>,
    recorded_total: AtomicU64,
    rate_limited_total: AtomicU64,
    fail_open_total: AtomicU64,
}

impl AttemptLedger {
    /// Create a new ledger over the given store
    pub fn new(store: Arc<dyn ListStore>, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            metrics: None,
            recorded_total: AtomicU64::new(0),
            rate_limited_total: AtomicU64::new(0),
            fail_open_total: AtomicU64::new(0),
        }
    }

    /// Attach OpenTelemetry metrics
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Record a failed login attempt for `identity`
    ///
    /// Returns `RateLimited` when the identity's bucket is at capacity, in
    /// which case nothing is recorded. The read-check-append sequence is not
    /// atomic across concurrent callers: racers can transiently push a bucket
    /// past the cap by the number of racing calls.
    pub async fn record_failure(&self, identity: &str) -> RateDecision {
        match self.try_record(identity).await {
            Ok(RateDecision::Allowed) => {
                self.recorded_total.fetch_add(1, Ordering::Relaxed);
                if let Some(metrics) = &self.metrics {
                    metrics.record_attempt_recorded();
                }
                debug!(identity, "failed login attempt recorded");
                RateDecision::Allowed
            }
            Ok(RateDecision::RateLimited) => {
                self.rate_limited_total.fetch_add(1, Ordering::Relaxed);
                if let Some(metrics) = &self.metrics {
                    metrics.record_rate_limited();
                }
                debug!(identity, "identity is rate limited");
                RateDecision::RateLimited
            }
            Err(err) => {
                // Fail open: infrastructure failure must not lock users out.
                self.fail_open_total.fetch_add(1, Ordering::Relaxed);
                if let Some(metrics) = &self.metrics {
                    metrics.record_fail_open();
                }
                warn!(identity, error = %err, "store error during rate check, allowing attempt");
                RateDecision::Allowed
            }
        }
    }

    /// Attempts recorded since startup
    pub fn recorded_total(&self) -> u64 {
        self.recorded_total.load(Ordering::Relaxed)
    }

    /// Attempts rejected at capacity since startup
    pub fn rate_limited_total(&self) -> u64 {
        self.rate_limited_total.load(Ordering::Relaxed)
    }

    /// Attempts permitted under the fail-open policy since startup
    pub fn fail_open_total(&self) -> u64 {
        self.fail_open_total.load(Ordering::Relaxed)
    }

    fn bucket_key(&self, identity: &str) -> String {
        format!("{}{}", identity, self.config.key_suffix)
    }

    fn window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.window)
            .unwrap_or_else(|_| chrono::Duration::seconds(i64::MAX / 1_000))
    }

    async fn try_record(&self, identity: &str) -> Result<RateDecision, StoreError> {
        let key = self.bucket_key(identity);

        let count = self.store.len(&key).await?;
        if u64::from(self.config.max_attempts) <= count {
            return Ok(RateDecision::RateLimited);
        }

        self.prune_expired(&key, count).await;

        let record = FailedAttempt::new(identity, Utc::now(), self.window());
        let serialized = serde_json::to_string(&record)?;
        self.store.append(&key, &serialized).await?;

        // Refresh the key-level TTL so an abandoned bucket self-destructs.
        // The record is already in; a TTL failure is logged, not fatal.
        if let Err(err) = self.store.expire(&key, self.config.window).await {
            warn!(key, error = %err, "failed to refresh bucket TTL");
        }

        Ok(RateDecision::Allowed)
    }

    /// Remove entries whose expiry has passed; best-effort
    ///
    /// Corrupt entries are skipped, read and removal failures are logged and
    /// tolerated; a partial prune only means a slightly higher count until
    /// the next access or the key TTL.
    async fn prune_expired(&self, key: &str, count: u64) {
        let now = Utc::now();

        for index in 0..count {
            let raw = match self.store.read_at(key, index).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key, index, error = %err, "failed to read record during pruning");
                    continue;
                }
            };

            let record: FailedAttempt = match serde_json::from_str(&raw) {
                Ok(record) => record,
                Err(err) => {
                    warn!(key, index, error = %err, "skipping corrupt attempt record");
                    continue;
                }
            };

            if record.is_expired(now) {
                match self.store.remove(key, &raw).await {
                    Ok(_) => debug!(key, "pruned expired attempt record"),
                    Err(err) => {
                        warn!(key, error = %err, "failed to remove expired attempt record")
                    }
                }
            }
        }
    }
}
