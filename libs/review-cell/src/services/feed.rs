use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::{Profile, UNKNOWN_CLIENT};

use crate::models::{
    CreateReviewRequest, RatingSummary, Review, ReviewError, ReviewView, MAX_RATING, MIN_RATING,
};

/// Review feed aggregator: reviews scoped to a therapist, batch-joined with
/// reviewer profiles, plus the rating rollup.
pub struct ReviewFeedService {
    supabase: SupabaseClient,
}

impl ReviewFeedService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_for_therapist(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ReviewView>> {
        let path = format!(
            "/rest/v1/reviews?therapist_id=eq.{}&order=created_at.desc",
            therapist_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let reviews: Vec<Review> = rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect::<Result<_>>()?;

        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let client_ids: Vec<Uuid> = {
            let mut seen = HashSet::new();
            reviews
                .iter()
                .map(|r| r.client_id)
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let profiles = match self.fetch_profiles(&client_ids, auth_token).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!("Reviewer profile lookup failed, degrading to placeholders: {}", e);
                HashMap::new()
            }
        };

        Ok(merge_reviews(reviews, &profiles))
    }

    pub async fn get_rating_summary(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<RatingSummary> {
        let path = format!(
            "/rest/v1/reviews?therapist_id=eq.{}&select=rating",
            therapist_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let ratings: Vec<i32> = rows
            .iter()
            .filter_map(|row| row["rating"].as_i64())
            .map(|r| r as i32)
            .collect();

        Ok(rating_summary(&ratings))
    }

    pub async fn create_review(
        &self,
        client_id: Uuid,
        request: CreateReviewRequest,
        auth_token: &str,
    ) -> Result<Review, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            return Err(ReviewError::InvalidRating);
        }

        // One review per (client, therapist) pair.
        let existing_path = format!(
            "/rest/v1/reviews?client_id=eq.{}&therapist_id=eq.{}&select=id",
            client_id, request.therapist_id
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(ReviewError::AlreadyReviewed);
        }

        debug!(
            "Creating review by client {} for therapist {}",
            client_id, request.therapist_id
        );

        let review_data = json!({
            "client_id": client_id,
            "therapist_id": request.therapist_id,
            "rating": request.rating,
            "comment": request.comment,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/reviews",
                Some(auth_token),
                Some(review_data),
            )
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ReviewError::DatabaseError("Insert returned no row".to_string()))?;
        serde_json::from_value(row).map_err(|e| ReviewError::DatabaseError(e.to_string()))
    }

    async fn fetch_profiles(
        &self,
        client_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<HashMap<Uuid, Profile>> {
        let path = format!(
            "/rest/v1/profiles?id={}",
            SupabaseClient::in_filter(client_ids)
        );
        let rows: Vec<Profile> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }
}

fn merge_reviews(reviews: Vec<Review>, profiles: &HashMap<Uuid, Profile>) -> Vec<ReviewView> {
    reviews
        .into_iter()
        .map(|review| {
            let (client_name, client_image_url) = match profiles.get(&review.client_id) {
                Some(profile) => (profile.display_name(), profile.image_url()),
                None => (UNKNOWN_CLIENT.to_string(), String::new()),
            };
            ReviewView {
                review,
                client_name,
                client_image_url,
            }
        })
        .collect()
}

/// Mean to one decimal plus a per-star histogram. Out-of-range ratings are
/// ignored rather than trusted.
pub fn rating_summary(ratings: &[i32]) -> RatingSummary {
    let mut distribution = [0usize; 5];
    let mut sum = 0i64;
    let mut counted = 0usize;

    for &rating in ratings {
        if (MIN_RATING..=MAX_RATING).contains(&rating) {
            distribution[(rating - 1) as usize] += 1;
            sum += rating as i64;
            counted += 1;
        }
    }

    let average_rating = if counted == 0 {
        0.0
    } else {
        (sum as f64 / counted as f64 * 10.0).round() / 10.0
    };

    RatingSummary {
        average_rating,
        total_reviews: counted,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_averages_to_one_decimal() {
        let summary = rating_summary(&[5, 4, 4]);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.distribution, [0, 0, 0, 2, 1]);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = rating_summary(&[]);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.total_reviews, 0);
    }

    #[test]
    fn out_of_range_ratings_are_ignored() {
        let summary = rating_summary(&[5, 0, 6, -1]);
        assert_eq!(summary.total_reviews, 1);
        assert_eq!(summary.average_rating, 5.0);
    }

    #[test]
    fn merge_falls_back_for_unknown_reviewer() {
        let review = Review {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            therapist_id: Uuid::new_v4(),
            rating: 4,
            comment: None,
            created_at: Utc::now(),
        };

        let views = merge_reviews(vec![review], &HashMap::new());
        assert_eq!(views[0].client_name, UNKNOWN_CLIENT);
    }
}
