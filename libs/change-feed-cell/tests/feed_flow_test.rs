use serde_json::json;
use uuid::Uuid;

use change_feed_cell::models::{ChangeEventKind, ChangeWebhookPayload};
use change_feed_cell::ChangeFeedRegistry;

#[tokio::test]
async fn webhook_delivery_reaches_page_subscription() {
    let registry = ChangeFeedRegistry::new();
    let therapist = Uuid::new_v4();

    let mut receiver = registry.subscribe("appointments", therapist).await;

    // The database webhook delivers a raw row-change payload.
    let payload = ChangeWebhookPayload {
        event: ChangeEventKind::Insert,
        table: "appointments".to_string(),
        record: Some(json!({
            "id": Uuid::new_v4().to_string(),
            "client_id": Uuid::new_v4().to_string(),
            "therapist_id": therapist.to_string(),
            "status": "pending"
        })),
        old_record: None,
    };

    let delivered = registry.publish(&payload.into_event()).await;
    assert_eq!(delivered, 1);

    let event = receiver.recv().await.unwrap();
    assert_eq!(event.table, "appointments");
    assert_eq!(event.event, ChangeEventKind::Insert);
    assert_eq!(
        event.row["therapist_id"].as_str(),
        Some(therapist.to_string().as_str())
    );
}

#[tokio::test]
async fn duplicate_deliveries_are_safe_to_consume() {
    let registry = ChangeFeedRegistry::new();
    let user = Uuid::new_v4();

    let mut receiver = registry.subscribe("messages", user).await;

    let payload = ChangeWebhookPayload {
        event: ChangeEventKind::Insert,
        table: "messages".to_string(),
        record: Some(json!({
            "sender_id": Uuid::new_v4().to_string(),
            "receiver_id": user.to_string()
        })),
        old_record: None,
    };
    let event = payload.into_event();

    // The push channel guarantees no ordering or dedup; consumers re-fetch
    // on each event, so delivering twice is fine.
    registry.publish(&event).await;
    registry.publish(&event).await;

    assert!(receiver.recv().await.is_ok());
    assert!(receiver.recv().await.is_ok());
}

#[tokio::test]
async fn page_switch_keeps_one_subscription_per_pair() {
    let registry = ChangeFeedRegistry::new();
    let user = Uuid::new_v4();

    // Page mounts, unmounts, mounts again: the second mount replaces the
    // first channel instead of stacking a duplicate.
    let _first = registry.subscribe("notifications", user).await;
    let _second = registry.subscribe("notifications", user).await;

    assert_eq!(registry.active_subscriptions().await.len(), 1);
}
