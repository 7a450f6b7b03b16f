use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AppointmentError, CreateSessionNoteRequest, SessionNote, UpdateSessionNoteRequest,
};

pub struct SessionNoteService {
    supabase: SupabaseClient,
}

impl SessionNoteService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create a session note. An appointment carries at most one note, so a
    /// linked create checks for an existing note first.
    pub async fn create_note(
        &self,
        therapist_id: &str,
        request: CreateSessionNoteRequest,
        auth_token: &str,
    ) -> Result<SessionNote, AppointmentError> {
        if request.title.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }

        if let Some(appointment_id) = request.appointment_id {
            let existing_path = format!(
                "/rest/v1/session_notes?appointment_id=eq.{}&select=id",
                appointment_id
            );
            let existing: Vec<Value> = self
                .supabase
                .request(Method::GET, &existing_path, Some(auth_token), None)
                .await
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

            if !existing.is_empty() {
                return Err(AppointmentError::NoteAlreadyExists);
            }
        }

        debug!(
            "Creating session note for client {} (appointment: {:?})",
            request.client_id, request.appointment_id
        );

        let note_data = json!({
            "appointment_id": request.appointment_id,
            "client_id": request.client_id,
            "therapist_id": therapist_id,
            "title": request.title,
            "content": request.content,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/session_notes",
                Some(auth_token),
                Some(note_data),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no row".to_string()))?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    /// Update a note. The patch is scoped to the calling therapist, so a
    /// foreign note simply comes back as not found.
    pub async fn update_note(
        &self,
        therapist_id: &str,
        note_id: Uuid,
        request: UpdateSessionNoteRequest,
        auth_token: &str,
    ) -> Result<SessionNote, AppointmentError> {
        let mut update_data = serde_json::Map::new();

        if let Some(title) = request.title {
            update_data.insert("title".to_string(), json!(title));
        }
        if let Some(content) = request.content {
            update_data.insert("content".to_string(), json!(content));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/session_notes?id=eq.{}&therapist_id=eq.{}",
            note_id, therapist_id
        );
        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NoteNotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn list_for_therapist(
        &self,
        therapist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<SessionNote>> {
        let path = format!(
            "/rest/v1/session_notes?therapist_id=eq.{}&order=created_at.desc",
            therapist_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect()
    }
}
