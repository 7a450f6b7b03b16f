use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointed at a mock remote store (wiremock server URI).
    pub fn with_remote(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "client".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn therapist(email: &str) -> Self {
        Self::new(email, "therapist")
    }

    pub fn client(email: &str) -> Self {
        Self::new(email, "client")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned remote-store rows for wiremock-backed tests.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn profile_response(id: &str, full_name: &str, role: &str) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": full_name,
            "email": format!("{}@example.com", role),
            "profile_image_url": format!("https://cdn.example.com/avatars/{}.jpg", id),
            "role": role,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        id: &str,
        client_id: &str,
        therapist_id: &str,
        start_time: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "client_id": client_id,
            "therapist_id": therapist_id,
            "start_time": start_time,
            "end_time": "2025-05-01T10:00:00Z",
            "status": status,
            "session_type": "video",
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn message_response(
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        is_read: bool,
        created_at: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "sender_id": sender_id,
            "receiver_id": receiver_id,
            "content": content,
            "is_read": is_read,
            "created_at": created_at
        })
    }

    pub fn notification_response(id: &str, user_id: &str, is_read: bool) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "title": "Test notification",
            "message": "Something happened",
            "type": "appointment",
            "is_read": is_read,
            "action_url": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn transaction_response(
        id: &str,
        therapist_id: &str,
        amount: f64,
        transaction_type: &str,
        status: &str,
        created_at: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "therapist_id": therapist_id,
            "amount": amount,
            "transaction_type": transaction_type,
            "status": status,
            "created_at": created_at
        })
    }

    pub fn review_response(
        id: &str,
        client_id: &str,
        therapist_id: &str,
        rating: i32,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "client_id": client_id,
            "therapist_id": therapist_id,
            "rating": rating,
            "comment": "Very helpful sessions",
            "created_at": "2024-03-01T00:00:00Z"
        })
    }

    pub fn session_note_response(
        id: &str,
        appointment_id: Option<&str>,
        client_id: &str,
        therapist_id: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "appointment_id": appointment_id,
            "client_id": client_id,
            "therapist_id": therapist_id,
            "title": "Session recap",
            "content": "Discussed progress since last session",
            "created_at": "2024-02-01T00:00:00Z",
            "updated_at": "2024-02-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::therapist("t@example.com");
        assert_eq!(user.email, "t@example.com");
        assert_eq!(user.role, "therapist");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
        assert!(user_model.is_therapist());
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }
}
