use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Profile, ProfileError, UpdateProfileRequest};

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_profile(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Profile, ProfileError> {
        debug!("Fetching profile: {}", user_id);

        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ProfileError::NotFound)?;
        serde_json::from_value(row).map_err(|e| ProfileError::DatabaseError(e.to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
        auth_token: &str,
    ) -> Result<Profile, ProfileError> {
        debug!("Updating profile: {}", user_id);

        // Only provided fields are written.
        let mut update_data = serde_json::Map::new();
        if let Some(name) = request.full_name {
            if name.trim().is_empty() {
                return Err(ProfileError::ValidationError(
                    "full name must not be empty".to_string(),
                ));
            }
            update_data.insert("full_name".to_string(), json!(name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(timezone) = request.timezone {
            update_data.insert("timezone".to_string(), json!(timezone));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
            )
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(ProfileError::NotFound)?;
        serde_json::from_value(row).map_err(|e| ProfileError::DatabaseError(e.to_string()))
    }
}
