//! Session token payload
//!
//! Represents one issued session. The expiry is fixed at issuance and never
//! extended; validity is a pure function of wall-clock time against
//! `expired_at`. Issued → Valid → Expired is one-way.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// The logical content of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Unique per issuance, drawn from OS randomness
    pub id: Uuid,

    /// The principal the token authenticates
    pub subject_id: i64,

    pub issued_at: DateTime<Utc>,

    /// `issued_at + duration`; never extended after issuance
    pub expired_at: DateTime<Utc>,
}

impl TokenPayload {
    /// Issue a payload for `subject_id` valid for `duration`
    ///
    /// Fails only if the OS randomness source fails or the duration cannot
    /// be represented; no partial payload is ever returned.
    pub fn issue(subject_id: i64, duration: Duration) -> Result<Self, TokenError> {
        let lifetime = chrono::Duration::from_std(duration)
            .map_err(|e| TokenError::InvalidDuration(e.to_string()))?;

        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::IdGeneration(e.to_string()))?;
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid();

        let issued_at = Utc::now();
        Ok(Self {
            id,
            subject_id,
            issued_at,
            expired_at: issued_at + lifetime,
        })
    }

    /// Check whether the payload is still valid
    ///
    /// Pure; no side effects. Returns `Err(TokenError::Expired)` strictly
    /// after `expired_at`, forever.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.expired_at < Utc::now() {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_is_exact() {
        let payload = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();

        assert_eq!(
            payload.expired_at - payload.issued_at,
            chrono::Duration::seconds(60)
        );
        assert_eq!(payload.subject_id, 42);
    }

    #[test]
    fn test_valid_immediately_after_issuance() {
        let payload = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        let first = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();
        let second = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_id_is_random_v4() {
        let payload = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();
        assert_eq!(payload.id.get_version_num(), 4);
    }

    #[test]
    fn test_expired_after_lifetime() {
        let payload = TokenPayload::issue(42, Duration::from_millis(10)).unwrap();

        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(payload.validate(), Err(TokenError::Expired));
    }

    #[test]
    fn test_expired_validation_is_idempotent() {
        let payload = TokenPayload::issue(42, Duration::from_millis(10)).unwrap();

        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(payload.validate(), Err(TokenError::Expired));
        assert_eq!(payload.validate(), Err(TokenError::Expired));
        assert_eq!(payload.validate(), Err(TokenError::Expired));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let payload = TokenPayload::issue(42, Duration::from_secs(60)).unwrap();

        let json = serde_json::to_string(&payload).unwrap();
        let parsed: TokenPayload = serde_json::from_str(&json).unwrap();

        assert_eq!(payload, parsed);
    }
}
