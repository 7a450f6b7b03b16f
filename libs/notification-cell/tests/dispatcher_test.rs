use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::models::{ContactRequest, NotificationKind};
use notification_cell::services::contact::ContactService;
use notification_cell::services::dispatcher::NotificationDispatcher;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn mark_all_as_read_then_unread_count_is_zero() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    // Two unread notifications; the PATCH flips both.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .and(query_param("is_read", "eq.false"))
        .and(body_partial_json(json!({ "is_read": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // After the flip the unread query finds nothing.
    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("is_read", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let dispatcher = NotificationDispatcher::new(&config);

    assert!(dispatcher.mark_all_as_read(user_id, "test-token").await);

    let unread = dispatcher.unread_count(user_id, "test-token").await.unwrap();
    assert_eq!(unread, 0);
}

#[tokio::test]
async fn unread_count_reflects_unread_rows() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("is_read", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::notification_response(
                &Uuid::new_v4().to_string(),
                &user_id.to_string(),
                false
            ),
            MockSupabaseResponses::notification_response(
                &Uuid::new_v4().to_string(),
                &user_id.to_string(),
                false
            ),
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let dispatcher = NotificationDispatcher::new(&config);

    let unread = dispatcher.unread_count(user_id, "test-token").await.unwrap();
    assert_eq!(unread, 2);
}

#[tokio::test]
async fn create_notification_reports_failure_as_false() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("boom", "internal"),
        ))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let dispatcher = NotificationDispatcher::new(&config);

    let persisted = dispatcher
        .create_notification(
            user_id,
            "Payment received",
            "Your payout has cleared",
            NotificationKind::Payment,
            None,
            "test-token",
        )
        .await;

    assert!(!persisted);
}

#[tokio::test]
async fn create_notification_succeeds_against_store() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({
            "user_id": user_id,
            "type": "appointment",
            "is_read": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::notification_response(
                &Uuid::new_v4().to_string(),
                &user_id.to_string(),
                false
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let dispatcher = NotificationDispatcher::new(&config);

    let persisted = dispatcher
        .create_notification(
            user_id,
            "New appointment",
            "A client booked a session",
            NotificationKind::Appointment,
            Some("/appointments"),
            "test-token",
        )
        .await;

    assert!(persisted);
}

#[tokio::test]
async fn contact_submission_calls_remote_procedure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/submit_contact_message"))
        .and(body_partial_json(json!({
            "p_name": "Ana",
            "p_email": "ana@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let contact_service = ContactService::new(&config);

    let request = ContactRequest {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        subject: "Billing".to_string(),
        message: "Question about my invoice".to_string(),
        user_id: None,
    };

    contact_service
        .submit(&request, "anon-key")
        .await
        .expect("rpc submission should succeed");
}
