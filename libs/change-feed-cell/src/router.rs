// libs/change-feed-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::registry::ChangeFeedRegistry;

/// Feed routes need both the app config (remote store access for raised
/// notifications) and the in-process subscription registry.
#[derive(Clone)]
pub struct FeedState {
    pub config: Arc<AppConfig>,
    pub registry: ChangeFeedRegistry,
}

pub fn feed_routes(config: Arc<AppConfig>, registry: ChangeFeedRegistry) -> Router {
    let state = FeedState {
        config: config.clone(),
        registry,
    };

    let protected_routes = Router::new()
        .route("/ws/{table}", get(handlers::ws_subscribe))
        .route("/ingest", post(handlers::ingest_change))
        .route("/subscriptions", get(handlers::get_active_subscriptions))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
