// libs/messaging-cell/src/handlers.rs
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

use crate::models::{MessagingError, SendMessageRequest};
use crate::services::conversation::ConversationService;

fn caller_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

fn map_messaging_error(e: MessagingError) -> AppError {
    match e {
        MessagingError::ValidationError(msg) => AppError::BadRequest(msg),
        MessagingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn get_conversations(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let conversation_service = ConversationService::new(&state);
    let conversations = conversation_service
        .fetch_conversations(user_id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = conversations.len();
    Ok(Json(json!({
        "conversations": conversations,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    if request.receiver_id == user_id {
        return Err(AppError::BadRequest(
            "Cannot send a message to yourself".to_string(),
        ));
    }

    let conversation_service = ConversationService::new(&state);
    let message = conversation_service
        .send_message(user_id, request, token)
        .await
        .map_err(map_messaging_error)?;

    Ok(Json(json!({
        "success": true,
        "message": message
    })))
}

#[axum::debug_handler]
pub async fn mark_conversation_read(
    State(state): State<Arc<AppConfig>>,
    Path(partner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let conversation_service = ConversationService::new(&state);
    conversation_service
        .mark_conversation_read(user_id, partner_id, token)
        .await
        .map_err(map_messaging_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_unread_total(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let conversation_service = ConversationService::new(&state);
    let unread = conversation_service
        .unread_total(user_id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "unread": unread })))
}
