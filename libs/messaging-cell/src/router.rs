// libs/messaging-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn messaging_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/conversations", get(handlers::get_conversations))
        .route("/", post(handlers::send_message))
        .route("/unread", get(handlers::get_unread_total))
        .route("/conversations/{partner_id}/read", post(handlers::mark_conversation_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
