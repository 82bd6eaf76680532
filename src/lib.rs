//! login-shield - Brute-force protection and session tokens for login endpoints
//!
//! This crate provides the two mechanisms that decide the security posture of
//! a hosted login flow: a distributed failed-attempt ledger backed by a shared
//! ordered-list store, and short-lived session token payloads with a pure
//! validity check.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod models;
pub mod otel;
pub mod server;
pub mod store;
pub mod token;
