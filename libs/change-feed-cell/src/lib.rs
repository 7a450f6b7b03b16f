pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use router::{feed_routes, FeedState};
pub use services::registry::ChangeFeedRegistry;
pub use services::refresh::RefreshCoordinator;
