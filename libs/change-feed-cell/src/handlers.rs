// libs/change-feed-cell/src/handlers.rs
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Extension, Path, State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use notification_cell::models::NotificationKind;
use notification_cell::services::dispatcher::NotificationDispatcher;

use crate::models::{ChangeEvent, ChangeEventKind, ChangeWebhookPayload};
use crate::router::FeedState;
use crate::services::registry::FeedReceiver;

// Tables a portal page may watch.
const SUBSCRIBABLE_TABLES: &[&str] = &[
    "appointments",
    "messages",
    "notifications",
    "transactions",
    "reviews",
    "session_notes",
];

fn caller_uuid(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Invalid user id in token".to_string()))
}

/// Open the page's push channel: one WebSocket per (table, user). The
/// client re-runs its fetch on every delivered event.
#[axum::debug_handler]
pub async fn ws_subscribe(
    State(state): State<FeedState>,
    Path(table): Path<String>,
    Extension(user): Extension<User>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    if !SUBSCRIBABLE_TABLES.contains(&table.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Table {} is not subscribable",
            table
        )));
    }

    let user_id = caller_uuid(&user)?;
    let receiver = state.registry.subscribe(&table, user_id).await;
    let registry = state.registry.clone();

    Ok(ws.on_upgrade(move |socket| async move {
        stream_events(socket, receiver).await;
        // One socket per (table, user) at a time; closing it tears the
        // subscription down.
        registry.unsubscribe(&table, user_id).await;
    }))
}

async fn stream_events(mut socket: WebSocket, mut receiver: FeedReceiver) {
    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        warn!("Dropping unserializable change event");
                        continue;
                    };
                    if socket.send(WsMessage::Text(text.into())).await.is_err() {
                        debug!("WebSocket peer went away");
                        break;
                    }
                }
                // Subscription replaced or torn down: the channel silently
                // stops; the client reconnects if it still cares.
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged, skipped {} events", skipped);
                    continue;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(_)) => continue,
                _ => break,
            },
        }
    }
}

/// Database webhook ingress: one row change per delivery. Publishes into
/// the registry and raises notifications for the event types that warrant
/// them.
#[axum::debug_handler]
pub async fn ingest_change(
    State(state): State<FeedState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(payload): Json<ChangeWebhookPayload>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let event = payload.into_event();

    let delivered = state.registry.publish(&event).await;
    raise_notifications(&state, &event, token).await;

    Ok(Json(json!({
        "success": true,
        "delivered": delivered
    })))
}

/// Side-channel alerts for specific event types. Persistence of the
/// notification is best-effort; a failure never fails the ingest.
async fn raise_notifications(state: &FeedState, event: &ChangeEvent, token: &str) {
    if event.event != ChangeEventKind::Insert {
        return;
    }

    let dispatcher = NotificationDispatcher::new(&state.config);

    match event.table.as_str() {
        "appointments" => {
            if let Some(therapist_id) = event.row_uuid("therapist_id") {
                dispatcher
                    .create_notification(
                        therapist_id,
                        "New appointment",
                        "A client booked a session with you",
                        NotificationKind::Appointment,
                        Some("/appointments"),
                        token,
                    )
                    .await;
            }
        }
        "messages" => {
            if let Some(receiver_id) = event.row_uuid("receiver_id") {
                dispatcher
                    .create_notification(
                        receiver_id,
                        "New message",
                        "You have a new message",
                        NotificationKind::Message,
                        Some("/messages"),
                        token,
                    )
                    .await;
            }
        }
        _ => {}
    }
}

#[axum::debug_handler]
pub async fn get_active_subscriptions(
    State(state): State<FeedState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth(
            "Subscription listing is admin-only".to_string(),
        ));
    }

    let subscriptions = state.registry.active_subscriptions().await;
    let entries: Vec<Value> = subscriptions
        .iter()
        .map(|key| json!({ "table": key.table, "user_id": key.user_id }))
        .collect();

    let count = entries.len();
    Ok(Json(json!({
        "subscriptions": entries,
        "count": count
    })))
}
