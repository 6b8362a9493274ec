pub mod auth;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use crate::database::UserStore;

/// Periodically drops revoked tokens that have expired on their own.
pub fn spawn_blacklist_purge(store: Arc<dyn UserStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired_tokens(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "Purged expired blacklisted tokens"),
                Err(e) => tracing::error!(error = %e, "Blacklist purge failed"),
            }
        }
    })
}
