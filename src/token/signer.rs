//! Token signing seam
//!
//! Turns payloads into bearer token strings and back. Signature verification
//! is the signer's whole job: expiry is deliberately NOT checked here so the
//! payload's own `validate` stays the single authority on lifetime.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

use super::TokenPayload;

/// Signs payloads into bearer tokens and verifies their integrity
#[cfg_attr(test, mockall::automock)]
pub trait TokenSigner: Send + Sync {
    /// Produce a signed bearer token carrying the payload
    fn sign(&self, payload: &TokenPayload) -> Result<String, TokenError>;

    /// Verify integrity and decode the payload
    ///
    /// An expired payload still verifies; callers decide validity through
    /// `TokenPayload::validate`.
    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError>;
}

/// JWT claim set carried inside the signed token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: Uuid,
    sub: i64,
    iat: i64,
    exp: i64,
}

/// HS256 JWT implementation of the signer
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtSigner {
    /// Create a signer with a shared HMAC secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Lifetime is the payload's concern, not the codec's
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let claims = Claims {
            jti: payload.id,
            sub: payload.subject_id,
            iat: payload.issued_at.timestamp(),
            exp: payload.expired_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let claims = data.claims;

        let issued_at = DateTime::<Utc>::from_timestamp(claims.iat, 0)
            .ok_or_else(|| TokenError::Invalid("issued_at out of range".to_string()))?;
        let expired_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Invalid("expired_at out of range".to_string()))?;

        Ok(TokenPayload {
            id: claims.jti,
            subject_id: claims.sub,
            issued_at,
            expired_at,
        })
    }
}
