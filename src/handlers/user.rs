use std::collections::BTreeMap;
use axum::extract::{Extension, State};
use axum::http::{header::SET_COOKIE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use crate::auth::cookie::{expired_refresh_cookie, read_cookie, refresh_cookie, REFRESH_COOKIE};
use crate::auth::jwt::TokenType;
use crate::database::StoreError;
use crate::dtos::user::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshResponse, RegisterUserRequest,
    UpdateUserRequest, UserResponse,
};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::auth::AuthContext;
use crate::models::user::{NewUser, ProfileChanges};
use crate::state::AppState;
use crate::validation::{validate_email, validate_password, validate_username};

/// Empty strings count as absent, the same as a missing key.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn registration_failure(err: StoreError) -> AppError {
    match err {
        StoreError::Integrity(_) => AppError::unexpected("Database integrity error", err),
        other => AppError::unexpected("An unexpected error occurred", other),
    }
}

// POST /api/users/register/
#[instrument(skip(state, payload))]
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (email, password, username) = match (
        present(payload.email),
        present(payload.password),
        present(payload.username),
    ) {
        (Some(email), Some(password), Some(username)) => (email, password, username),
        (email, password, username) => {
            let missing = [
                ("email", email.is_none()),
                ("password", password.is_none()),
                ("username", username.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(AppError::MissingFields(missing));
        }
    };

    if !validate_email(&email) {
        return Err(AppError::validation("Invalid email format").on_field("email"));
    }

    if state.store.email_taken(&email, None).await.map_err(registration_failure)? {
        return Err(AppError::validation("Email already exists").on_field("email"));
    }
    if state.store.username_taken(&username, None).await.map_err(registration_failure)? {
        return Err(AppError::validation("Username already exists").on_field("username"));
    }

    if let Err(messages) = validate_password(&password) {
        return Err(AppError::validation("Invalid password")
            .on_field("password")
            .with_details(json!(messages)));
    }

    let password_hash = state
        .hasher
        .hash(&password)
        .await
        .map_err(|e| AppError::unexpected("An unexpected error occurred", e))?;

    let user = state
        .store
        .create_user(NewUser { email, username, password_hash })
        .await
        .map_err(registration_failure)?;

    info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// POST /api/users/login/
#[instrument(skip(state, payload))]
pub async fn login_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Response, AppError> {
    let (email, password) = match (present(payload.email), present(payload.password)) {
        (Some(email), Some(password)) => (email, password),
        (None, None) => return Err(AppError::validation("Both email and password are required")),
        (None, Some(_)) => return Err(AppError::validation("Email is required").on_field("email")),
        (Some(_), None) => return Err(AppError::validation("Password is required").on_field("password")),
    };

    if !validate_email(&email) {
        return Err(AppError::validation("Invalid email format").on_field("email"));
    }

    let user = state
        .store
        .find_by_email(&email)
        .await
        .map_err(|e| AppError::unexpected("An unexpected error occurred", e))?
        .ok_or_else(|| AppError::not_found("No user found with this email").on_field("email"))?;

    if !user.is_active {
        return Err(AppError::forbidden("This account has been deactivated"));
    }

    let ok = state
        .hasher
        .verify(&password, &user.password_hash)
        .await
        .map_err(|e| AppError::unexpected("An unexpected error occurred", e))?;
    if !ok {
        return Err(AppError::validation("Incorrect password").on_field("password"));
    }

    let pair = state.tokens.issue_pair(user.id).map_err(|e| {
        error!(error = %e, "Error generating tokens");
        AppError::internal("Error during login process")
    })?;
    let cookie = refresh_cookie(&pair.refresh, state.cookie_secure).map_err(|e| {
        error!(error = %e, "Error building refresh cookie");
        AppError::internal("Error during login process")
    })?;

    info!(user_id = user.id, "User logged in");
    let body = LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: UserResponse::from(user),
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

// POST /api/users/refresh/
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let refresh = read_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| AppError::validation("Refresh token is missing"))?;

    let access = state
        .tokens
        .access_from_refresh(refresh)
        .map_err(|e| AppError::unauthorized("Invalid refresh token").with_details(json!(e.to_string())))?;

    let revoked = state
        .store
        .is_blacklisted(refresh)
        .await
        .map_err(|e| AppError::unexpected("Error during token refresh process", e))?;
    if revoked {
        return Err(AppError::unauthorized("Refresh token is blacklisted"));
    }

    Ok(Json(RefreshResponse { access }))
}

// GET /api/users/user/
pub async fn get_me(Extension(auth): Extension<AuthContext>) -> Json<UserResponse> {
    Json(UserResponse::from(auth.user))
}

// PATCH /api/users/user/
#[instrument(skip(state, auth, payload), fields(user_id = auth.user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = auth.user.id;
    let lookup_failure = |e: StoreError| AppError::unexpected("Error updating user data", e);
    let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

    if let Some(email) = &payload.email {
        if email.is_empty() {
            errors.entry("email").or_default().push("This field may not be blank.".into());
        } else if !validate_email(email) {
            errors.entry("email").or_default().push("Enter a valid email address.".into());
        } else if state.store.email_taken(email, Some(user_id)).await.map_err(lookup_failure)? {
            errors.entry("email").or_default().push("user with this email address already exists.".into());
        }
    }

    if let Some(username) = &payload.username {
        if username.is_empty() {
            errors.entry("username").or_default().push("This field may not be blank.".into());
        } else if let Err(message) = validate_username(username) {
            errors.entry("username").or_default().push(message);
        } else if state.store.username_taken(username, Some(user_id)).await.map_err(lookup_failure)? {
            errors.entry("username").or_default().push("A user with that username already exists.".into());
        }
    }

    if !errors.is_empty() {
        return Err(AppError::validation("Invalid data").with_details(json!(errors)));
    }

    let changes = ProfileChanges { email: payload.email, username: payload.username };
    let user = state
        .store
        .update_profile(user_id, changes)
        .await
        .map_err(|e| match e {
            StoreError::Integrity(_) => AppError::unexpected("Database integrity error", e),
            other => AppError::unexpected("Error updating user data", other),
        })?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// POST /api/users/logout/
#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn logout_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_id = auth.user.id;

    if let Some(refresh) = read_cookie(&headers, REFRESH_COOKIE) {
        match state.tokens.verify(refresh, TokenType::Refresh) {
            Ok(claims) => {
                if let Err(e) = state.store.blacklist_token(refresh, user_id, claims.expires_at()).await {
                    error!(error = %e, "Error blacklisting refresh token");
                }
            }
            Err(e) => warn!(error = %e, user_id, "Invalid refresh token during logout"),
        }
    }

    if let Err(e) = state.store.blacklist_token(&auth.token, user_id, auth.token_expires_at).await {
        error!(error = %e, "Error blacklisting access token");
    }

    info!(user_id, "User logged out");
    (
        [(SET_COOKIE, expired_refresh_cookie())],
        Json(LogoutResponse { detail: "Successfully logged out." }),
    )
}
