use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DocumentUploadRequest, OnboardingError};

const BUCKET: &str = "verification-documents";

/// License/identity documents uploaded during onboarding, stored per user
/// in the verification bucket.
pub struct VerificationDocumentService {
    supabase: SupabaseClient,
}

impl VerificationDocumentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn upload_document(
        &self,
        user_id: &str,
        request: DocumentUploadRequest,
        auth_token: &str,
    ) -> Result<String, OnboardingError> {
        debug!("Uploading verification document for user: {}", user_id);

        // Strip the data-URL prefix ("data:application/pdf;base64,...").
        let parts: Vec<&str> = request.file_data.split(',').collect();
        let base64_data = if parts.len() > 1 { parts[1] } else { &request.file_data };

        let file_bytes = BASE64
            .decode(base64_data)
            .map_err(|e| OnboardingError::StorageError(format!("Invalid file data: {}", e)))?;

        let file_ext = request
            .file_name
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty())
            .unwrap_or("pdf");

        let object_path = format!("{}/{}.{}", user_id, Uuid::new_v4(), file_ext);
        let upload_path = format!("/storage/v1/object/{}/{}", BUCKET, object_path);

        let content_type = if request.file_data.starts_with("data:") {
            request
                .file_data
                .trim_start_matches("data:")
                .split(';')
                .next()
                .unwrap_or("application/octet-stream")
                .to_string()
        } else {
            "application/octet-stream".to_string()
        };

        let _: Value = self
            .supabase
            .request(
                Method::POST,
                &upload_path,
                Some(auth_token),
                Some(json!({
                    "data": file_bytes,
                    "contentType": content_type
                })),
            )
            .await
            .map_err(|e| OnboardingError::StorageError(e.to_string()))?;

        let public_url = self
            .supabase
            .get_public_url(&format!("/storage/v1/object/public/{}/{}", BUCKET, object_path));

        Ok(public_url)
    }

    pub async fn list_documents(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Value>, OnboardingError> {
        let path = format!("/storage/v1/object/list/{}", BUCKET);

        self.supabase
            .request(
                Method::POST,
                &path,
                Some(auth_token),
                Some(json!({ "prefix": user_id })),
            )
            .await
            .map_err(|e| OnboardingError::StorageError(e.to_string()))
    }
}
