// libs/notification-cell/src/handlers.rs
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

use crate::models::{ContactRequest, CreateNotificationRequest};
use crate::services::contact::ContactService;
use crate::services::dispatcher::NotificationDispatcher;

fn caller_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let dispatcher = NotificationDispatcher::new(&state);
    let notifications = dispatcher
        .list_for_user(user_id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let unread = notifications.iter().filter(|n| !n.is_read).count();
    let count = notifications.len();
    Ok(Json(json!({
        "notifications": notifications,
        "count": count,
        "unread": unread
    })))
}

#[axum::debug_handler]
pub async fn get_unread_count(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let dispatcher = NotificationDispatcher::new(&state);
    let unread = dispatcher
        .unread_count(user_id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "unread": unread })))
}

#[axum::debug_handler]
pub async fn create_notification(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    // Users raise notifications for themselves; system/admin callers may
    // target anyone.
    if !user.is_self(&request.user_id.to_string()) && !user.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to notify this user".to_string(),
        ));
    }

    let dispatcher = NotificationDispatcher::new(&state);
    let persisted = dispatcher
        .create_notification(
            request.user_id,
            &request.title,
            &request.message,
            request.kind,
            request.action_url.as_deref(),
            token,
        )
        .await;

    Ok(Json(json!({ "success": persisted })))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<AppConfig>>,
    Path(notification_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let dispatcher = NotificationDispatcher::new(&state);
    let success = dispatcher.mark_as_read(notification_id, user_id, token).await;

    Ok(Json(json!({ "success": success })))
}

#[axum::debug_handler]
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let user_id = caller_uuid(&user)?;

    let dispatcher = NotificationDispatcher::new(&state);
    let success = dispatcher.mark_all_as_read(user_id, token).await;

    Ok(Json(json!({ "success": success })))
}

/// Contact form intake. Unauthenticated: the SPA's public contact page
/// posts here with the anon key only.
#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Value>, AppError> {
    let problems = request.validate();
    if !problems.is_empty() {
        return Err(AppError::Validation(problems));
    }

    let contact_service = ContactService::new(&state);
    contact_service
        .submit(&request, &state.supabase_anon_key)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Thanks for reaching out. We'll get back to you soon."
    })))
}
