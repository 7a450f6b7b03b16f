// libs/onboarding-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    DocumentUploadRequest, OnboardingError, StepTransitionRequest, SubmitOnboardingRequest,
};
use crate::services::documents::VerificationDocumentService;
use crate::services::enrollment::EnrollmentService;
use crate::services::wizard;

fn map_onboarding_error(e: OnboardingError) -> AppError {
    match e {
        OnboardingError::ValidationFailed(problems) => AppError::Validation(problems),
        OnboardingError::TermsNotAccepted | OnboardingError::NotOnFinalStep => {
            AppError::BadRequest(e.to_string())
        }
        OnboardingError::DatabaseError(msg) => AppError::Database(msg),
        OnboardingError::StorageError(msg) => AppError::ExternalService(msg),
    }
}

/// Forward wizard move: validates the current step's fields only.
#[axum::debug_handler]
pub async fn advance_step(
    State(_state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Json(request): Json<StepTransitionRequest>,
) -> Result<Json<Value>, AppError> {
    match wizard::advance(request.current_step, &request.form) {
        Ok(next) => Ok(Json(json!({
            "success": true,
            "step": next
        }))),
        Err(problems) => Err(AppError::Validation(problems)),
    }
}

/// Backward wizard move: unconditional.
#[axum::debug_handler]
pub async fn back_step(
    State(_state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Json(request): Json<StepTransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let previous = wizard::back(request.current_step);
    Ok(Json(json!({
        "success": true,
        "step": previous
    })))
}

/// Final submission: all steps re-validated, terms required, then a single
/// transactional enrollment procedure on the remote store.
#[axum::debug_handler]
pub async fn submit_onboarding(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SubmitOnboardingRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let enrollment_service = EnrollmentService::new(&state);
    let result = enrollment_service
        .submit(&user.id, &request.form, token)
        .await
        .map_err(map_onboarding_error)?;

    Ok(Json(json!({
        "success": true,
        "enrollment": result,
        "message": "Onboarding complete. Your profile is pending verification."
    })))
}

#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<DocumentUploadRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let document_service = VerificationDocumentService::new(&state);
    let url = document_service
        .upload_document(&user.id, request, token)
        .await
        .map_err(map_onboarding_error)?;

    Ok(Json(json!({
        "success": true,
        "url": url
    })))
}

#[axum::debug_handler]
pub async fn list_documents(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let document_service = VerificationDocumentService::new(&state);
    let documents = document_service
        .list_documents(&user.id, token)
        .await
        .map_err(map_onboarding_error)?;

    let count = documents.len();
    Ok(Json(json!({
        "documents": documents,
        "count": count
    })))
}
