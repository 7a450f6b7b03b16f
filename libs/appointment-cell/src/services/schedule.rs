use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest,
};

pub struct AppointmentScheduleService {
    supabase: SupabaseClient,
}

impl AppointmentScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Book a new appointment. Starts life as `pending`; the therapist
    /// confirms it separately.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking appointment for client {} with therapist {}",
            request.client_id, request.therapist_id
        );

        if request.end_time <= request.start_time {
            return Err(AppointmentError::InvalidTime(
                "end_time must be after start_time".to_string(),
            ));
        }
        if request.start_time <= Utc::now() {
            return Err(AppointmentError::InvalidTime(
                "start_time must be in the future".to_string(),
            ));
        }

        let appointment_data = json!({
            "client_id": request.client_id,
            "therapist_id": request.therapist_id,
            "start_time": request.start_time.to_rfc3339(),
            "end_time": request.end_time.to_rfc3339(),
            "status": AppointmentStatus::Pending,
            "session_type": request.session_type,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    /// Apply a status change, enforcing the monotonic transition rules.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if !current.status.can_transition_to(new_status) {
            warn!(
                "Rejected status transition {} -> {} for appointment {}",
                current.status, new_status, appointment_id
            );
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: new_status,
            });
        }

        self.patch_appointment(
            appointment_id,
            json!({
                "status": new_status,
                "updated_at": Utc::now().to_rfc3339()
            }),
            auth_token,
        )
        .await
    }

    /// Cancel an open appointment, recording the reason.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        if !current
            .status
            .can_transition_to(AppointmentStatus::Cancelled)
        {
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: AppointmentStatus::Cancelled,
            });
        }

        self.patch_appointment(
            appointment_id,
            json!({
                "status": AppointmentStatus::Cancelled,
                "notes": format!("Cancelled: {}", reason),
                "updated_at": Utc::now().to_rfc3339()
            }),
            auth_token,
        )
        .await
    }

    /// Search the caller's own appointments. The scope column is chosen by
    /// role so cross-user data is never fetched.
    pub async fn search_appointments(
        &self,
        scope_column: &str,
        user_id: &str,
        query: &AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let mut query_parts = vec![format!("{}=eq.{}", scope_column, user_id)];

        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = query.from_date {
            query_parts.push(format!("start_time=gte.{}", from.to_rfc3339()));
        }
        if let Some(to) = query.to_date {
            query_parts.push(format!("start_time=lte.{}", to.to_rfc3339()));
        }

        let mut path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        path.push_str("&order=start_time.desc");

        if let Some(limit) = query.limit {
            path.push_str(&format!("&limit={}", limit));
        }
        if let Some(offset) = query.offset {
            path.push_str(&format!("&offset={}", offset));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| anyhow!(e)))
            .collect()
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        body: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let result: Vec<Value> = self
            .supabase
            .request_returning(Method::PATCH, &path, Some(auth_token), Some(body))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}
