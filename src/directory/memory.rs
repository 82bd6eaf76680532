//! In-memory implementation of the user directory

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::DirectoryError;
use crate::models::{NewUser, User};

use super::UserDirectory;

/// In-memory user directory keyed by email
#[derive(Debug)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicI64,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create_user(&self, user: NewUser) -> Result<User, DirectoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(DirectoryError::Duplicate(user.email));
        }

        let record = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            email: user.email.clone(),
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.email, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.id == id).cloned())
    }
}
