use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::{Html, IntoResponse};
use crate::error::AppError;
use crate::state::AppState;

const NEVER_CACHE: &str = "max-age=0, no-cache, no-store, must-revalidate, private";

/// Serves the front-end entrypoint for every route the API does not claim;
/// client-side routing takes it from there.
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let html = tokio::fs::read_to_string(state.spa_index_path.as_path())
        .await
        .map_err(|e| {
            tracing::warn!(path = %state.spa_index_path.display(), error = %e, "SPA index unavailable");
            AppError::not_found("Front-end build not found")
        })?;

    Ok(([(CACHE_CONTROL, NEVER_CACHE)], Html(html)))
}
