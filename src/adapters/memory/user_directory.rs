use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of UserDirectory.
///
/// Supports stateful testing by registering users with their email address.
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, String>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Register a user with an email address.
    pub fn add_user(&self, user_id: UserId, email: impl Into<String>) {
        self.users.lock().unwrap().insert(user_id, email.into());
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectoryTrait for InMemoryUserDirectory {
    async fn exists(&self, user_id: UserId) -> Result<bool> {
        Ok(self.users.lock().unwrap().contains_key(&user_id))
    }

    async fn get_email(&self, user_id: UserId) -> Result<String> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| format!("user {} is not registered", user_id).into())
    }
}
