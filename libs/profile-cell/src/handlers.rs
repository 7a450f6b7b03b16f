// libs/profile-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvatarUploadRequest, ProfileError, UpdateProfileRequest};
use crate::services::avatar::AvatarService;
use crate::services::profile::ProfileService;

fn map_profile_error(e: ProfileError) -> AppError {
    match e {
        ProfileError::NotFound => AppError::NotFound("Profile not found".to_string()),
        ProfileError::ValidationError(msg) => AppError::BadRequest(msg),
        ProfileError::DatabaseError(msg) => AppError::Database(msg),
        ProfileError::StorageError(msg) => AppError::ExternalService(msg),
    }
}

#[axum::debug_handler]
pub async fn get_own_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let profile_service = ProfileService::new(&state);
    let profile = profile_service
        .get_profile(&user.id, token)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(json!(profile)))
}

/// Public-facing profile of another user (names/avatars for conversation
/// partners and therapist pages).
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Path(profile_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let profile_service = ProfileService::new(&state);
    let profile = profile_service
        .get_profile(&profile_id.to_string(), token)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_own_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let profile_service = ProfileService::new(&state);
    let profile = profile_service
        .update_profile(&user.id, request, token)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

#[axum::debug_handler]
pub async fn upload_avatar(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<AvatarUploadRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let avatar_service = AvatarService::new(&state);
    let url = avatar_service
        .upload_avatar(&user.id, &request.file_data, token)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(json!({
        "success": true,
        "url": url
    })))
}

#[axum::debug_handler]
pub async fn remove_avatar(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let avatar_service = AvatarService::new(&state);
    avatar_service
        .remove_avatar(&user.id, token)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(json!({ "success": true })))
}
