//! Application error types for login-shield
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Authentication-related errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials did not match a known user
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Rate limited due to too many failed attempts
    #[error("Too many failed attempts, try again later")]
    RateLimited,

    /// Bearer token expired; the caller must re-authenticate
    #[error("Token has expired")]
    TokenExpired,

    /// Bearer token failed integrity or structural checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token payload could not be issued or signed
    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// User directory failure
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Errors from the shared ordered-list store
///
/// Any of these observed by the attempt ledger triggers the fail-open policy:
/// the attempt is permitted, the condition is logged and counted.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the command
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The per-operation deadline expired before the store responded
    #[error("Store operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A record could not be serialized for storage
    #[error("Record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Token payload errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Validation performed after `expired_at`; terminal state
    #[error("Token has expired")]
    Expired,

    /// The random-identifier source failed during issuance
    #[error("Identifier generation failed: {0}")]
    IdGeneration(String),

    /// The requested lifetime cannot be represented
    #[error("Invalid token lifetime: {0}")]
    InvalidDuration(String),

    /// Signing the payload failed
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// A presented token failed decoding or signature verification
    #[error("Token is invalid: {0}")]
    Invalid(String),
}

/// User directory errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory backend could not be reached
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    /// A user with the same email already exists
    #[error("User already exists: {0}")]
    Duplicate(String),
}
