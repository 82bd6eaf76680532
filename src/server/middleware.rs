//! HTTP middleware for login-shield
//!
//! Bearer-token authentication for protected routes. The signer checks
//! integrity, the payload checks its own expiry; an expired token gets a
//! distinct response so clients know to re-authenticate rather than retry.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::token::TokenPayload;

use super::router::{ApiError, AppState};

/// Authenticated token payload attached to the request
#[derive(Clone, Debug)]
pub struct AuthenticatedSubject(pub TokenPayload);

/// Bearer authentication middleware
///
/// Extracts the Authorization header, verifies the token, and adds the
/// payload to the request extensions for handlers to consume.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(value) if value.starts_with("Bearer ") => value.trim_start_matches("Bearer "),
        _ => return Err(ApiError::unauthorized("missing bearer token")),
    };

    let payload = state.auth_manager.authorize(token)?;
    request
        .extensions_mut()
        .insert(AuthenticatedSubject(payload));

    Ok(next.run(request).await)
}
