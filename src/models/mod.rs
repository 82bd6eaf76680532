//! Domain models for login-shield

pub mod attempt;
pub mod user;

pub use attempt::FailedAttempt;
pub use user::{CreateUserRequest, LoginRequest, LoginResponse, NewUser, User, UserInfo};
