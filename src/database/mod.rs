// src/database/mod.rs
mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::{create_pool, PgUserStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use crate::models::user::{NewUser, ProfileChanges, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or foreign-key constraint rejected the write.
    #[error("{0}")]
    Integrity(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for users and revoked tokens.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// True when another user (not `except`) already owns `email`.
    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, StoreError>;

    /// True when another user (not `except`) already owns `username`.
    async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Returns `None` when the user does not exist.
    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<Option<User>, StoreError>;

    /// Records a revoked token. Revoking the same token twice is a no-op.
    async fn blacklist_token(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn is_blacklisted(&self, token: &str) -> Result<bool, StoreError>;

    /// Drops revoked tokens that expired before `now`; returns how many went.
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
