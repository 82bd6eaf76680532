//! Authentication manager
//!
//! The main authentication interface for the application: registration,
//! the login flow, and bearer authorization. Every failed credential check
//! is reported to the attempt ledger; the ledger's decision is surfaced to
//! the caller as a distinct rate-limited outcome, never as a generic error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::directory::UserDirectory;
use crate::error::{AuthError, TokenError};
use crate::ledger::{AttemptLedger, RateDecision};
use crate::models::{CreateUserRequest, LoginResponse, NewUser, UserInfo};
use crate::otel::Metrics;
use crate::token::{TokenPayload, TokenSigner};

use super::password;

/// Configuration for the authentication manager
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of issued session tokens
    pub token_duration: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_duration: Duration::from_secs(900),
        }
    }
}

/// Authentication manager
pub struct AuthManager {
    directory: Arc<dyn UserDirectory>,
    signer: Arc<dyn TokenSigner>,
    ledger: Arc<AttemptLedger>,
    config: AuthConfig,
    metrics: Option<Arc<Metrics>>,
}

impl AuthManager {
    /// Create a new authentication manager
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        signer: Arc<dyn TokenSigner>,
        ledger: Arc<AttemptLedger>,
        config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            signer,
            ledger,
            config,
            metrics: None,
        }
    }

    /// Attach OpenTelemetry metrics
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Register a new user
    pub async fn register(&self, request: CreateUserRequest) -> Result<UserInfo, AuthError> {
        let password_hash =
            password::hash_password(&request.password).map_err(|e| AuthError::Hash(e.to_string()))?;

        let user = self
            .directory
            .create_user(NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "user registered");
        Ok(UserInfo::from(&user))
    }

    /// Verify credentials and issue a signed session token
    ///
    /// A directory failure is a hard error: the fail-open policy covers only
    /// the attempt ledger's store, not credential verification itself.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = match self.directory.find_by_email(email).await? {
            Some(user) if password::verify_password(password, &user.password_hash) => user,
            _ => return Err(self.reject(email).await),
        };

        let payload = TokenPayload::issue(user.id, self.config.token_duration)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;
        let access_token = self
            .signer
            .sign(&payload)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

        if let Some(metrics) = &self.metrics {
            metrics.record_login("success");
            metrics.record_token_issued();
        }
        info!(user_id = user.id, "login succeeded");

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_at: payload.expired_at,
            user: UserInfo::from(&user),
        })
    }

    /// Verify a bearer token and return its payload if still valid
    pub fn authorize(&self, bearer: &str) -> Result<TokenPayload, AuthError> {
        let payload = self
            .signer
            .verify(bearer)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        match payload.validate() {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_token_validation("valid");
                }
                Ok(payload)
            }
            Err(TokenError::Expired) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_token_validation("expired");
                }
                Err(AuthError::TokenExpired)
            }
            Err(other) => Err(AuthError::InvalidToken(other.to_string())),
        }
    }

    /// Fetch a user's public view by id
    pub async fn get_user(&self, id: i64) -> Result<Option<UserInfo>, AuthError> {
        Ok(self.directory.find_by_id(id).await?.as_ref().map(UserInfo::from))
    }

    /// Report a failed credential check and map the ledger's decision
    async fn reject(&self, email: &str) -> AuthError {
        match self.ledger.record_failure(email).await {
            RateDecision::RateLimited => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_login("rate_limited");
                }
                warn!(identity = email, "login rejected: too many failed attempts");
                AuthError::RateLimited
            }
            RateDecision::Allowed => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_login("invalid_credentials");
                }
                AuthError::InvalidCredentials
            }
        }
    }
}
