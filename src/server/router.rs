//! HTTP router for login-shield
//!
//! This module defines the axum router that handles all HTTP requests:
//! - Health check and ledger metrics
//! - User registration and login
//! - Authenticated user lookup behind the bearer middleware

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthManager;
use crate::error::{AuthError, DirectoryError};
use crate::ledger::AttemptLedger;
use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, UserInfo};
use crate::otel::Metrics;

use super::middleware::{require_bearer, AuthenticatedSubject};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authentication manager
    pub auth_manager: Arc<AuthManager>,

    /// Attempt ledger (exposed for the metrics endpoint)
    pub ledger: Arc<AttemptLedger>,

    /// OpenTelemetry metrics
    pub metrics: Option<Arc<Metrics>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Ledger counters exposed for operational visibility
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub attempts_recorded_total: u64,
    pub rate_limited_total: u64,
    pub fail_open_total: u64,
}

/// Error payload returned to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API error with an HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Directory(DirectoryError::Duplicate(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Build the main application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/users/:id", get(get_user_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        // Health and metrics endpoints (no auth required)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Login flow
        .route("/api/v1/users", post(register_handler))
        .route("/api/v1/users/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "up and running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ledger metrics endpoint handler
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(MetricsResponse {
        attempts_recorded_total: state.ledger.recorded_total(),
        rate_limited_total: state.ledger.rate_limited_total(),
        fail_open_total: state.ledger.fail_open_total(),
    })
}

/// User registration handler
async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth_manager.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login handler
async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let started = Instant::now();
    let result = state
        .auth_manager
        .login(&request.email, &request.password)
        .await;

    if let Some(metrics) = &state.metrics {
        metrics.record_login_duration(started.elapsed().as_secs_f64());
    }

    Ok(Json(result?))
}

/// Authenticated user lookup handler
async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(subject): Extension<AuthenticatedSubject>,
) -> Result<Json<UserInfo>, ApiError> {
    debug!(subject_id = subject.0.subject_id, user_id = id, "user lookup");

    match state.auth_manager.get_user(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::not_found("user not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Auth errors map to the right HTTP statuses
    #[test]
    fn test_auth_error_status_mapping() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::RateLimited).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidToken("bad".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Directory(DirectoryError::Duplicate(
                "user@example.com".to_string()
            )))
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::Directory(DirectoryError::Unavailable(
                "down".to_string()
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // Test 2: Health handler reports the crate version
    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
