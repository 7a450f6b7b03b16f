// libs/earnings-cell/src/handlers.rs
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

use crate::services::earnings::EarningsService;

fn require_therapist(user: &User) -> Result<(), AppError> {
    if user.is_therapist() || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Auth("Earnings are for therapists".to_string()))
    }
}

#[axum::debug_handler]
pub async fn list_transactions(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    require_therapist(&user)?;

    let earnings_service = EarningsService::new(&state);
    let transactions = earnings_service
        .list_transactions(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let count = transactions.len();
    Ok(Json(json!({
        "transactions": transactions,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_earnings_summary(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    require_therapist(&user)?;

    let earnings_service = EarningsService::new(&state);
    let summary = earnings_service
        .get_summary(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
pub async fn get_client_stats(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    require_therapist(&user)?;

    let earnings_service = EarningsService::new(&state);
    let stats = earnings_service
        .get_client_stats(&user.id, token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(stats)))
}
