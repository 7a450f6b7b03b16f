// libs/onboarding-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn onboarding_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/advance", post(handlers::advance_step))
        .route("/back", post(handlers::back_step))
        .route("/submit", post(handlers::submit_onboarding))
        .route("/documents", post(handlers::upload_document))
        .route("/documents", get(handlers::list_documents))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
