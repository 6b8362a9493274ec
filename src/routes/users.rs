use axum::{Router, routing::{post, get}, middleware};
use crate::state::AppState;
use crate::handlers::user::{register_user, login_user, refresh_token, get_me, update_me, logout_user};
use crate::middleware::auth::require_auth;

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/api/users/register/", post(register_user))
        .route("/api/users/login/", post(login_user))
        .route("/api/users/refresh/", post(refresh_token));

    let protected = Router::new()
        .route("/api/users/user/", get(get_me).patch(update_me))
        .route("/api/users/logout/", post(logout_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected)
}
