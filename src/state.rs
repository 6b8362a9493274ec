// src/state.rs
use std::path::PathBuf;
use std::sync::Arc;
use chrono::Duration;
use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::config::Config;
use crate::database::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub cookie_secure: bool,
    pub spa_index_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: &Config) -> Self {
        Self {
            store,
            tokens: TokenService::new(
                &config.jwt_secret,
                Duration::minutes(config.access_token_minutes),
                Duration::days(config.refresh_token_days),
            ),
            hasher: PasswordHasher::new(config.bcrypt_cost),
            cookie_secure: config.cookie_secure,
            spa_index_path: Arc::new(config.spa_index_path.clone()),
        }
    }
}
