//! User directory
//!
//! Lookup and persistence of user accounts. Email, login id and nickname
//! are each unique across the directory.

use async_trait::async_trait;
use quire_org::User;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{StoreError, StoreResult, UniqueField};

/// Storage trait for user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Find a user by email (exact match).
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by login id.
    async fn find_by_login_id(&self, login_id: &str) -> StoreResult<Option<User>>;

    /// Check whether an email is registered.
    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Check whether a login id is registered.
    async fn exists_by_login_id(&self, login_id: &str) -> StoreResult<bool>;

    /// Check whether a nickname is taken.
    async fn exists_by_nickname(&self, nickname: &str) -> StoreResult<bool>;

    /// Insert a user. Fails with [`StoreError::Duplicate`] naming the first
    /// unique field another user already holds.
    async fn insert(&self, user: User) -> StoreResult<()>;

    /// Overwrite a user. Fails with [`StoreError::Duplicate`] if a unique
    /// field now belongs to someone else.
    async fn update(&self, user: User) -> StoreResult<()>;

    /// Delete a user.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Users whose email or nickname contains `query` (case-insensitive),
    /// excluding `exclude`, at most `limit` results.
    async fn search(&self, query: &str, exclude: Uuid, limit: usize) -> StoreResult<Vec<User>>;
}

/// In-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(existing: &User, candidate: &User) -> Option<UniqueField> {
    if existing.id == candidate.id {
        return None;
    }
    if existing.email == candidate.email {
        return Some(UniqueField::Email);
    }
    if existing.nickname == candidate.nickname {
        return Some(UniqueField::Nickname);
    }
    match (&existing.login_id, &candidate.login_id) {
        (Some(a), Some(b)) if a == b => Some(UniqueField::LoginId),
        _ => None,
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_login_id(&self, login_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.login_id.as_deref() == Some(login_id))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_by_login_id(&self, login_id: &str) -> StoreResult<bool> {
        Ok(self.find_by_login_id(login_id).await?.is_some())
    }

    async fn exists_by_nickname(&self, nickname: &str) -> StoreResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.nickname == nickname))
    }

    async fn insert(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} exists", user.id)));
        }
        if let Some(field) = users.values().find_map(|u| clashes(u, &user)) {
            return Err(StoreError::Duplicate(field));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn update(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if let Some(field) = users.values().find_map(|u| clashes(u, &user)) {
            return Err(StoreError::Duplicate(field));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.users.write().await.remove(&id);
        Ok(())
    }

    async fn search(&self, query: &str, exclude: Uuid, limit: usize) -> StoreResult<Vec<User>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.users.read().await;
        let mut found: Vec<User> = users
            .values()
            .filter(|u| u.id != exclude)
            .filter(|u| {
                u.email.to_lowercase().contains(&needle)
                    || u.nickname.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.nickname.cmp(&b.nickname));
        found.truncate(limit);
        Ok(found)
    }
}
