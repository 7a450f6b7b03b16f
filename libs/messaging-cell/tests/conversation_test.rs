use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use messaging_cell::services::conversation::ConversationService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn conversation_for_partner_with_unread_and_last_message() {
    let mock_server = MockServer::start().await;
    let a = Uuid::new_v4(); // current user (receiver)
    let b = Uuid::new_v4(); // partner (sender)

    // Two messages between A and B; the later one is unread for A.
    // Primary query returns newest first.
    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::message_response(
                &Uuid::new_v4().to_string(),
                &b.to_string(),
                &a.to_string(),
                "see you next week",
                false,
                "2025-05-01T10:00:00Z"
            ),
            MockSupabaseResponses::message_response(
                &Uuid::new_v4().to_string(),
                &a.to_string(),
                &b.to_string(),
                "thanks for the session",
                true,
                "2025-05-01T09:00:00Z"
            ),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&b.to_string(), "Ben Partner", "therapist")
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ConversationService::new(&config);

    let conversations = service.fetch_conversations(a, "test-token").await.unwrap();

    assert_eq!(conversations.len(), 1);
    let conversation = &conversations[0];
    assert_eq!(conversation.partner_id, b);
    assert_eq!(conversation.partner_name, "Ben Partner");
    assert_eq!(conversation.unread_count, 1);
    assert_eq!(conversation.last_message, "see you next week");
}

#[tokio::test]
async fn partner_profile_miss_degrades_to_placeholder() {
    let mock_server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::message_response(
                &Uuid::new_v4().to_string(),
                &b.to_string(),
                &a.to_string(),
                "hello",
                false,
                "2025-05-01T10:00:00Z"
            )
        ])))
        .mount(&mock_server)
        .await;

    // No profile row for the partner.
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ConversationService::new(&config);

    let conversations = service.fetch_conversations(a, "test-token").await.unwrap();
    assert_eq!(conversations[0].partner_name, "Unknown Client");
}

#[tokio::test]
async fn rerun_without_remote_mutation_is_identical() {
    let mock_server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::message_response(
                &Uuid::new_v4().to_string(),
                &b.to_string(),
                &a.to_string(),
                "hello",
                false,
                "2025-05-01T10:00:00Z"
            )
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::profile_response(&b.to_string(), "Ben Partner", "client")
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ConversationService::new(&config);

    let first = service.fetch_conversations(a, "test-token").await.unwrap();
    let second = service.fetch_conversations(a, "test-token").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn mark_conversation_read_targets_partner_unread_only() {
    let mock_server = MockServer::start().await;
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/messages"))
        .and(query_param("receiver_id", format!("eq.{}", a)))
        .and(query_param("sender_id", format!("eq.{}", b)))
        .and(query_param("is_read", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = ConversationService::new(&config);

    service
        .mark_conversation_read(a, b, "test-token")
        .await
        .expect("mark read should succeed");
}
