// libs/earnings-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn earnings_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/transactions", get(handlers::list_transactions))
        .route("/summary", get(handlers::get_earnings_summary))
        .route("/clients", get(handlers::get_client_stats))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
