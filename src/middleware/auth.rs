use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::auth::jwt::TokenType;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated caller, attached to the request by [`require_auth`].
#[derive(Clone)]
pub struct AuthContext {
    pub user: User,
    /// Raw access token presented in the `Authorization` header.
    pub token: String,
    pub token_expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = match req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Authentication credentials were not provided."),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return unauthorized("Invalid Authorization format"),
    };

    let claims = match state.tokens.verify(&token, TokenType::Access) {
        Ok(c) => c,
        Err(e) => return unauthorized(&e.to_string()),
    };

    match state.store.is_blacklisted(&token).await {
        Ok(false) => {}
        Ok(true) => return unauthorized("Token has been revoked"),
        Err(e) => {
            tracing::error!(error = %e, "Blacklist lookup failed");
            return unauthorized("Token could not be checked");
        }
    }

    let user = match state.store.find_by_id(claims.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("User not found"),
        Err(e) => {
            tracing::error!(error = %e, user_id = claims.user_id, "User lookup failed");
            return unauthorized("User could not be loaded");
        }
    };

    if !user.is_active {
        return unauthorized("User is inactive");
    }

    let token_expires_at = claims.expires_at();
    req.extensions_mut().insert(AuthContext { user, token, token_expires_at });

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}
