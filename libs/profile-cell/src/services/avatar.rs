use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::ProfileError;

const BUCKET: &str = "profiles";

pub struct AvatarService {
    supabase: SupabaseClient,
}

impl AvatarService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Upload a new avatar and point the profile at its public URL.
    pub async fn upload_avatar(
        &self,
        user_id: &str,
        base64_image: &str,
        auth_token: &str,
    ) -> Result<String, ProfileError> {
        debug!("Uploading avatar for user: {}", user_id);

        // Strip the data-URL prefix ("data:image/jpeg;base64,/9j/4AAQ...").
        let parts: Vec<&str> = base64_image.split(',').collect();
        let base64_data = if parts.len() > 1 { parts[1] } else { base64_image };

        let image_data = BASE64
            .decode(base64_data)
            .map_err(|e| ProfileError::StorageError(format!("Invalid image data: {}", e)))?;

        let file_ext = if base64_image.contains("image/png") {
            "png"
        } else if base64_image.contains("image/jpeg") || base64_image.contains("image/jpg") {
            "jpg"
        } else {
            "png"
        };

        let filename = format!("avatars/{}/{}.{}", user_id, Uuid::new_v4(), file_ext);
        let upload_path = format!("/storage/v1/object/{}/{}", BUCKET, filename);

        let _: Value = self
            .supabase
            .request(
                Method::POST,
                &upload_path,
                Some(auth_token),
                Some(json!({
                    "data": image_data,
                    "contentType": format!("image/{}", file_ext)
                })),
            )
            .await
            .map_err(|e| ProfileError::StorageError(e.to_string()))?;

        let public_url = self
            .supabase
            .get_public_url(&format!("/storage/v1/object/public/{}/{}", BUCKET, filename));

        // Point the profile at the new image.
        let update_path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let updated: Vec<Value> = self
            .supabase
            .request_returning(
                Method::PATCH,
                &update_path,
                Some(auth_token),
                Some(json!({
                    "profile_image_url": public_url,
                    "updated_at": chrono::Utc::now().to_rfc3339()
                })),
            )
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        if updated.is_empty() {
            return Err(ProfileError::NotFound);
        }

        Ok(public_url)
    }

    /// Detach the avatar from the profile and delete the stored object.
    pub async fn remove_avatar(&self, user_id: &str, auth_token: &str) -> Result<(), ProfileError> {
        debug!("Removing avatar for user: {}", user_id);

        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        let profile = result.into_iter().next().ok_or(ProfileError::NotFound)?;

        if let Some(avatar_url) = profile["profile_image_url"].as_str() {
            if let Some(filename) = avatar_url.split(&format!("{}/", BUCKET)).nth(1) {
                let delete_path = format!("/storage/v1/object/{}/{}", BUCKET, filename);
                let _: Value = self
                    .supabase
                    .request(Method::DELETE, &delete_path, Some(auth_token), None)
                    .await
                    .map_err(|e| ProfileError::StorageError(e.to_string()))?;
            }
        }

        let _: Vec<Value> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({
                    "profile_image_url": null,
                    "updated_at": chrono::Utc::now().to_rfc3339()
                })),
            )
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
