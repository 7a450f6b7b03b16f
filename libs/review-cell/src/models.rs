// libs/review-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub client_id: Uuid,
    pub therapist_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub therapist_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Review joined with the reviewer's profile for the public therapist page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub client_name: String,
    pub client_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal; 0.0 with no reviews.
    pub average_rating: f64,
    pub total_reviews: usize,
    /// Count of reviews per star, index 0 = one star.
    pub distribution: [usize; 5],
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReviewError {
    #[error("Rating must be between {MIN_RATING} and {MAX_RATING}")]
    InvalidRating,

    #[error("Client has already reviewed this therapist")]
    AlreadyReviewed,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
