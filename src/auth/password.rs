use bcrypt::BcryptError;
use tokio::task::{spawn_blocking, JoinError};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] JoinError),
}

/// bcrypt hashing with a configurable work factor. Both operations run on the
/// blocking pool so a slow cost never stalls the async workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let cost = self.cost;
        Ok(spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        Ok(spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
