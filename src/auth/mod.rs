//! Authentication flows for login-shield
//!
//! This module ties the pieces together:
//! - Password hashing and verification (opaque one-way primitive)
//! - The login flow, consulting the attempt ledger on every credential failure
//! - Bearer-token authorization for protected routes

pub mod manager;
pub mod password;

pub use manager::{AuthConfig, AuthManager};
pub use password::{hash_password, verify_password, HashError};
