// src/database/memory.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use crate::models::blacklisted_token::BlacklistedToken;
use crate::models::user::{NewUser, ProfileChanges, User};
use super::{StoreError, UserStore};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    blacklisted_tokens: Vec<BlacklistedToken>,
    next_user_id: i64,
    next_token_id: i64,
}

/// Process-local store, used when no `DATABASE_URL` is configured and in tests.
/// Enforces the same uniqueness rules as the Postgres schema.
#[derive(Default)]
pub struct MemoryUserStore {
    tables: RwLock<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the active flag of an existing user. Returns false for unknown ids.
    pub async fn set_active(&self, id: i64, active: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }
}

fn others(tables: &Tables, except: Option<i64>) -> impl Iterator<Item = &User> + '_ {
    tables.users.iter().filter(move |u| Some(u.id) != except)
}

fn conflict(tables: &Tables, email: Option<&str>, username: Option<&str>, except: Option<i64>) -> Option<StoreError> {
    if let Some(email) = email {
        if others(tables, except).any(|u| u.email == email) {
            return Some(StoreError::Integrity(format!(
                "duplicate key value violates unique constraint \"users_email_key\" ({email})"
            )));
        }
    }
    if let Some(username) = username {
        if others(tables, except).any(|u| u.username == username) {
            return Some(StoreError::Integrity(format!(
                "duplicate key value violates unique constraint \"users_username_key\" ({username})"
            )));
        }
    }
    None
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.email == email && Some(u.id) != except))
    }

    async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.username == username && Some(u.id) != except))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(err) = conflict(&tables, Some(user.email.as_str()), Some(user.username.as_str()), None) {
            return Err(err);
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            is_active: true,
            date_joined: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(err) = conflict(&tables, changes.email.as_deref(), changes.username.as_deref(), Some(id)) {
            return Err(err);
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(username) = changes.username {
            user.username = username;
        }
        Ok(Some(user.clone()))
    }

    async fn blacklist_token(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::Integrity(format!(
                "insert on \"blacklisted_tokens\" violates foreign key constraint (user {user_id})"
            )));
        }
        if tables.blacklisted_tokens.iter().any(|t| t.token == token) {
            return Ok(());
        }

        tables.next_token_id += 1;
        let id = tables.next_token_id;
        tables.blacklisted_tokens.push(BlacklistedToken {
            id,
            token: token.to_string(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn is_blacklisted(&self, token: &str) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.blacklisted_tokens.iter().any(|t| t.token == token))
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.blacklisted_tokens.len();
        tables.blacklisted_tokens.retain(|t| t.expires_at >= now);
        Ok((before - tables.blacklisted_tokens.len()) as u64)
    }
}
