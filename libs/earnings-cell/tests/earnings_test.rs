use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use earnings_cell::services::earnings::EarningsService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn transactions_are_scoped_to_the_therapist() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .and(query_param("therapist_id", format!("eq.{}", therapist_id)))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::transaction_response(
                &Uuid::new_v4().to_string(),
                &therapist_id,
                120.0,
                "payment",
                "completed",
                "2025-05-02T10:00:00Z"
            ),
            MockSupabaseResponses::transaction_response(
                &Uuid::new_v4().to_string(),
                &therapist_id,
                90.0,
                "payment",
                "pending",
                "2025-05-01T10:00:00Z"
            ),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = EarningsService::new(&config);

    let transactions = service
        .list_transactions(&therapist_id, "test-token")
        .await
        .unwrap();

    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].amount, 120.0);
}

#[tokio::test]
async fn summary_reflects_fetched_transactions() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::transaction_response(
                &Uuid::new_v4().to_string(),
                &therapist_id,
                200.0,
                "payment",
                "completed",
                "2025-05-02T10:00:00Z"
            ),
            MockSupabaseResponses::transaction_response(
                &Uuid::new_v4().to_string(),
                &therapist_id,
                50.0,
                "refund",
                "completed",
                "2025-05-03T10:00:00Z"
            ),
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = EarningsService::new(&config);

    let summary = service.get_summary(&therapist_id, "test-token").await.unwrap();

    assert_eq!(summary.total_earnings, 150.0);
    assert_eq!(summary.pending_earnings, 0.0);
    assert_eq!(summary.monthly.len(), 12);
}
