//! User directory seam
//!
//! User records live behind this trait; relational persistence is an
//! external collaborator's concern. The in-memory implementation serves
//! tests and single-node deployments.

pub mod memory;

pub use memory::MemoryUserDirectory;

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::models::{NewUser, User};

/// Lookup and creation of user records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user; fails with `Duplicate` if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DirectoryError>;

    /// Find a user by login identity
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Find a user by directory id
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError>;
}
