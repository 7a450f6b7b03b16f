// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, BookAppointmentRequest, CancelAppointmentRequest,
    CreateSessionNoteRequest, UpdateSessionNoteRequest, UpdateStatusRequest,
};
use crate::services::directory::AppointmentDirectoryService;
use crate::services::notes::SessionNoteService;
use crate::services::schedule::AppointmentScheduleService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::NoteNotFound => AppError::NotFound("Session note not found".to_string()),
        AppointmentError::NoteAlreadyExists => {
            AppError::Conflict("Appointment already has a session note".to_string())
        }
        AppointmentError::InvalidTime(msg) => AppError::BadRequest(msg),
        AppointmentError::InvalidStatusTransition { from, to } => {
            AppError::BadRequest(format!("Cannot move appointment from {} to {}", from, to))
        }
        AppointmentError::Unauthorized => {
            AppError::Auth("Not authorized for this appointment".to_string())
        }
        AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Clients book for themselves; therapists and admins may book on behalf.
    let is_client = user.is_self(&request.client_id.to_string());
    if !is_client && !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to book appointment for this client".to_string(),
        ));
    }

    let schedule_service = AppointmentScheduleService::new(&state);
    let appointment = schedule_service
        .book_appointment(request, token)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = AppointmentScheduleService::new(&state);

    let appointment = schedule_service
        .get_appointment(appointment_id, token)
        .await
        .map_err(map_appointment_error)?;

    let is_participant = user.is_self(&appointment.client_id.to_string())
        || user.is_self(&appointment.therapist_id.to_string());
    if !is_participant && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view this appointment".to_string(),
        ));
    }

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AppointmentSearchQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = AppointmentScheduleService::new(&state);

    // Scope by the caller's own id; the portal role picks the column.
    let scope_column = if user.is_therapist() {
        "therapist_id"
    } else {
        "client_id"
    };

    let appointments = schedule_service
        .search_appointments(scope_column, &user.id, &query, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = appointments.len();
    Ok(Json(json!({
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = AppointmentScheduleService::new(&state);

    let current = schedule_service
        .get_appointment(appointment_id, token)
        .await
        .map_err(map_appointment_error)?;

    // Status moves are the therapist's side of the workflow.
    if !user.is_self(&current.therapist_id.to_string()) && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to update this appointment".to_string(),
        ));
    }

    let appointment = schedule_service
        .update_status(appointment_id, request.status, token)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let schedule_service = AppointmentScheduleService::new(&state);

    let current = schedule_service
        .get_appointment(appointment_id, token)
        .await
        .map_err(map_appointment_error)?;

    let is_participant = user.is_self(&current.client_id.to_string())
        || user.is_self(&current.therapist_id.to_string());
    if !is_participant && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to cancel this appointment".to_string(),
        ));
    }

    let appointment = schedule_service
        .cancel_appointment(appointment_id, &request.reason, token)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

// ==============================================================================
// DIRECTORY (AGGREGATED VIEW) HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_therapist_directory(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Directory view is for therapists".to_string(),
        ));
    }

    let directory_service = AppointmentDirectoryService::new(&state);
    let views = directory_service
        .list_for_therapist(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = views.len();
    Ok(Json(json!({
        "appointments": views,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_appointments_needing_notes(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Note coverage view is for therapists".to_string(),
        ));
    }

    let directory_service = AppointmentDirectoryService::new(&state);
    let views = directory_service
        .list_needing_notes(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = views.len();
    Ok(Json(json!({
        "appointments": views,
        "count": count
    })))
}

// ==============================================================================
// SESSION NOTE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_session_note(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSessionNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Only therapists can write session notes".to_string(),
        ));
    }

    let note_service = SessionNoteService::new(&state);
    let note = note_service
        .create_note(&user.id, request, token)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "note": note
    })))
}

#[axum::debug_handler]
pub async fn update_session_note(
    State(state): State<Arc<AppConfig>>,
    Path(note_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateSessionNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Only therapists can edit session notes".to_string(),
        ));
    }

    let note_service = SessionNoteService::new(&state);
    let note = note_service
        .update_note(&user.id, note_id, request, token)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "note": note
    })))
}

#[axum::debug_handler]
pub async fn list_session_notes(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    if !user.is_therapist() && !user.is_admin() {
        return Err(AppError::Auth(
            "Session notes are for therapists".to_string(),
        ));
    }

    let note_service = SessionNoteService::new(&state);
    let notes = note_service
        .list_for_therapist(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = notes.len();
    Ok(Json(json!({
        "notes": notes,
        "count": count
    })))
}
