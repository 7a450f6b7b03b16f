use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use profile_cell::models::{ProfileError, UpdateProfileRequest};
use profile_cell::services::profile::ProfileService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn missing_profile_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let result = service.get_profile(&Uuid::new_v4().to_string(), "test-token").await;
    assert_matches!(result, Err(ProfileError::NotFound));
}

#[tokio::test]
async fn update_writes_only_provided_fields() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .and(body_partial_json(json!({ "full_name": "Dana Rivers" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&user_id, "Dana Rivers", "therapist")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ProfileService::new(&config);

    let profile = service
        .update_profile(
            &user_id,
            UpdateProfileRequest {
                full_name: Some("Dana Rivers".to_string()),
                phone: None,
                timezone: None,
            },
            "test-token",
        )
        .await
        .unwrap();

    assert_eq!(profile.full_name.as_deref(), Some("Dana Rivers"));
}

#[tokio::test]
async fn empty_full_name_is_rejected_locally() {
    let config = TestConfig::default().to_app_config();
    let service = ProfileService::new(&config);

    let result = service
        .update_profile(
            "user-1",
            UpdateProfileRequest {
                full_name: Some("   ".to_string()),
                phone: None,
                timezone: None,
            },
            "test-token",
        )
        .await;

    assert_matches!(result, Err(ProfileError::ValidationError(_)));
}
