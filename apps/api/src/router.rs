use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use change_feed_cell::router::feed_routes;
use change_feed_cell::ChangeFeedRegistry;
use earnings_cell::router::earnings_routes;
use messaging_cell::router::messaging_routes;
use notification_cell::router::{contact_routes, notification_routes};
use onboarding_cell::router::onboarding_routes;
use profile_cell::router::profile_routes;
use review_cell::router::review_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>, registry: ChangeFeedRegistry) -> Router {
    Router::new()
        .route("/", get(|| async { "Solace Practice API is running!" }))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/messages", messaging_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/feed", feed_routes(state.clone(), registry))
        .nest("/earnings", earnings_routes(state.clone()))
        .nest("/reviews", review_routes(state.clone()))
        .nest("/onboarding", onboarding_routes(state.clone()))
        .nest("/profiles", profile_routes(state.clone()))
        .nest("/contact", contact_routes(state))
}
