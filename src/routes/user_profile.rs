use axum::{middleware, routing::get, Router};

use crate::handlers::user_profile::{get_profile, update_profile};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn user_profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
