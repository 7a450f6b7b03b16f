// libs/profile-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn profile_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/me", get(handlers::get_own_profile))
        .route("/me", patch(handlers::update_own_profile))
        .route("/me/avatar", post(handlers::upload_avatar))
        .route("/me/avatar", delete(handlers::remove_avatar))
        .route("/{profile_id}", get(handlers::get_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
