// libs/review-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateReviewRequest, ReviewError};
use crate::services::feed::ReviewFeedService;

fn map_review_error(e: ReviewError) -> AppError {
    match e {
        ReviewError::InvalidRating => AppError::BadRequest(e.to_string()),
        ReviewError::AlreadyReviewed => AppError::Conflict(e.to_string()),
        ReviewError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_reviews(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let feed_service = ReviewFeedService::new(&state);
    let reviews = feed_service
        .list_for_therapist(&therapist_id.to_string(), token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = reviews.len();
    Ok(Json(json!({
        "reviews": reviews,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_rating_summary(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let feed_service = ReviewFeedService::new(&state);
    let summary = feed_service
        .get_rating_summary(&therapist_id.to_string(), token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
pub async fn create_review(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let client_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Invalid user id in token".to_string()))?;

    let feed_service = ReviewFeedService::new(&state);
    let review = feed_service
        .create_review(client_id, request, token)
        .await
        .map_err(map_review_error)?;

    Ok(Json(json!({
        "success": true,
        "review": review
    })))
}
