//! Failed login attempt records
//!
//! One record per failed login event, serialized as JSON into the identity's
//! bucket in the shared store. Records are immutable once created; the only
//! mutation is deletion during lazy pruning.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single failed login attempt against an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAttempt {
    /// The login identifier the attempt was made against
    pub identity: String,

    /// When the attempt was recorded
    pub observed_at: DateTime<Utc>,

    /// When the record stops counting toward the limit
    ///
    /// Always `observed_at + window`; the window is constant-length, not
    /// sliding per removal.
    pub expires_at: DateTime<Utc>,
}

impl FailedAttempt {
    /// Create a record observed at `observed_at` that expires one window later
    pub fn new(identity: impl Into<String>, observed_at: DateTime<Utc>, window: Duration) -> Self {
        Self {
            identity: identity.into(),
            observed_at,
            expires_at: observed_at + window,
        }
    }

    /// Whether the record has stopped counting as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
