use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_cell::models::{CreateReviewRequest, ReviewError};
use review_cell::services::feed::ReviewFeedService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn review_feed_joins_reviewer_names() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4().to_string();
    let client_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .and(query_param("therapist_id", format!("eq.{}", therapist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_response(
                &Uuid::new_v4().to_string(),
                &client_id,
                &therapist_id,
                5
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&client_id, "Ana Client", "client")
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ReviewFeedService::new(&config);

    let reviews = service
        .list_for_therapist(&therapist_id, "test-token")
        .await
        .unwrap();

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].client_name, "Ana Client");
    assert_eq!(reviews[0].review.rating, 5);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_before_any_write() {
    let config = TestConfig::default().to_app_config();
    let service = ReviewFeedService::new(&config);

    let request = CreateReviewRequest {
        therapist_id: Uuid::new_v4(),
        rating: 6,
        comment: None,
    };

    let result = service
        .create_review(Uuid::new_v4(), request, "test-token")
        .await;
    assert_matches!(result, Err(ReviewError::InvalidRating));
}

#[tokio::test]
async fn second_review_for_same_therapist_conflicts() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .and(query_param("client_id", format!("eq.{}", client_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4().to_string() }
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ReviewFeedService::new(&config);

    let request = CreateReviewRequest {
        therapist_id,
        rating: 4,
        comment: Some("Great".to_string()),
    };

    let result = service.create_review(client_id, request, "test-token").await;
    assert_matches!(result, Err(ReviewError::AlreadyReviewed));
}
