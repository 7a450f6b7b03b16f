use assert_matches::assert_matches;
use chrono::NaiveTime;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use onboarding_cell::models::{
    AvailabilitySlot, OnboardingError, TherapistOnboardingForm, MIN_BIO_LEN,
};
use onboarding_cell::services::enrollment::EnrollmentService;
use shared_utils::test_utils::TestConfig;

fn complete_form() -> TherapistOnboardingForm {
    let mut form = TherapistOnboardingForm::default();
    form.personal.full_name = "Dana Rivers".to_string();
    form.personal.timezone = "Europe/London".to_string();
    form.credentials.bio = "Licensed therapist with a decade of practice in CBT and ACT.".to_string();
    form.credentials.license_number = "LIC-0042".to_string();
    form.credentials.years_experience = 10;
    form.credentials.specializations = vec!["CBT".to_string(), "ACT".to_string()];
    form.availability = vec![AvailabilitySlot {
        day_of_week: 2,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    }];
    form.rates.hourly_rate = 90.0;
    form.agreement.terms_accepted = true;
    form
}

#[tokio::test]
async fn submit_goes_through_single_enrollment_procedure() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/enroll_therapist"))
        .and(body_partial_json(json!({
            "p_user_id": user_id,
            "p_license_number": "LIC-0042",
            "p_hourly_rate": 90.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "therapist_id": user_id })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = EnrollmentService::new(&config);

    let result = service
        .submit(&user_id, &complete_form(), "test-token")
        .await
        .expect("enrollment should succeed");

    assert_eq!(result["therapist_id"].as_str(), Some(user_id.as_str()));
}

#[tokio::test]
async fn submit_with_short_bio_never_reaches_the_store() {
    let mock_server = MockServer::start().await;

    // No RPC mock mounted: any request would 404 and fail differently.
    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = EnrollmentService::new(&config);

    let mut form = complete_form();
    form.credentials.bio = "x".repeat(MIN_BIO_LEN - 1);

    let result = service.submit("user-1", &form, "test-token").await;
    assert_matches!(result, Err(OnboardingError::ValidationFailed(_)));
}

#[tokio::test]
async fn submit_without_terms_is_rejected() {
    let config = TestConfig::default().to_app_config();
    let service = EnrollmentService::new(&config);

    let mut form = complete_form();
    form.agreement.terms_accepted = false;

    let result = service.submit("user-1", &form, "test-token").await;
    assert_matches!(result, Err(OnboardingError::ValidationFailed(problems)) => {
        assert!(problems.iter().any(|p| p.contains("terms")));
    });
}

#[tokio::test]
async fn remote_procedure_failure_surfaces_as_database_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/enroll_therapist"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_remote(&mock_server.uri()).to_app_config();
    let service = EnrollmentService::new(&config);

    let result = service.submit("user-1", &complete_form(), "test-token").await;
    assert_matches!(result, Err(OnboardingError::DatabaseError(_)));
}
