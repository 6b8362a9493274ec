pub mod ai_models;
pub mod users;

use axum::Router;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::handlers::spa;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(ai_models::routes())
        .merge(users::routes(state))
        .fallback(spa::index)
}

/// Full application: API routes, SPA fallback, request tracing and, when
/// origins are configured, credentialed CORS.
pub fn create_app(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let app = create_router(state.clone())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let origins: Vec<HeaderValue> = cors_allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return app;
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
