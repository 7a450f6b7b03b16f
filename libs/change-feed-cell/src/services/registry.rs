use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{ChangeEvent, SubscriptionKey};

pub type FeedSender = broadcast::Sender<ChangeEvent>;
pub type FeedReceiver = broadcast::Receiver<ChangeEvent>;

const CHANNEL_CAPACITY: usize = 100;

/// Fan-out hub for row-change events.
///
/// Holds at most one live channel per (table, user) pair: re-subscribing
/// replaces the previous channel, which closes any receivers still attached
/// to it. Consumers re-fetch on every event, so duplicate or reordered
/// deliveries are harmless.
pub struct ChangeFeedRegistry {
    channels: Arc<RwLock<HashMap<SubscriptionKey, FeedSender>>>,
}

impl ChangeFeedRegistry {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a subscription for row changes on `table` scoped to `user_id`.
    /// Any previous subscription for the same pair is torn down.
    pub async fn subscribe(&self, table: &str, user_id: Uuid) -> FeedReceiver {
        let key = SubscriptionKey {
            table: table.to_string(),
            user_id,
        };

        let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);

        let mut channels = self.channels.write().await;
        if channels.insert(key, sender).is_some() {
            debug!(
                "Replaced existing {} subscription for user {}",
                table, user_id
            );
        } else {
            debug!("Opened {} subscription for user {}", table, user_id);
        }

        receiver
    }

    pub async fn unsubscribe(&self, table: &str, user_id: Uuid) {
        let key = SubscriptionKey {
            table: table.to_string(),
            user_id,
        };
        let mut channels = self.channels.write().await;
        if channels.remove(&key).is_some() {
            debug!("Closed {} subscription for user {}", table, user_id);
        }
    }

    /// Route an event to every subscriber of its table whose user the row
    /// concerns. Returns how many subscribers were handed the event.
    pub async fn publish(&self, event: &ChangeEvent) -> usize {
        let channels = self.channels.read().await;
        let mut delivered = 0;

        for (key, sender) in channels.iter() {
            if key.table != event.table || !event.concerns(key.user_id) {
                continue;
            }
            match sender.send(event.clone()) {
                Ok(_) => delivered += 1,
                Err(_) => {
                    // All receivers dropped; the entry is cleaned up on the
                    // next subscribe/unsubscribe for this pair.
                    warn!(
                        "No live receivers for {} subscription of user {}",
                        key.table, key.user_id
                    );
                }
            }
        }

        debug!(
            "Published {} on {} to {} subscriber(s)",
            event.event, event.table, delivered
        );
        delivered
    }

    pub async fn active_subscriptions(&self) -> Vec<SubscriptionKey> {
        let channels = self.channels.read().await;
        channels.keys().cloned().collect()
    }
}

impl Default for ChangeFeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ChangeFeedRegistry {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeEventKind;
    use serde_json::json;

    fn appointment_event(user_id: Uuid) -> ChangeEvent {
        ChangeEvent {
            table: "appointments".to_string(),
            event: ChangeEventKind::Insert,
            row: json!({ "therapist_id": user_id.to_string() }),
        }
    }

    #[tokio::test]
    async fn event_reaches_matching_subscriber() {
        let registry = ChangeFeedRegistry::new();
        let user = Uuid::new_v4();

        let mut receiver = registry.subscribe("appointments", user).await;
        let delivered = registry.publish(&appointment_event(user)).await;

        assert_eq!(delivered, 1);
        let event = receiver.recv().await.unwrap();
        assert_eq!(event.table, "appointments");
    }

    #[tokio::test]
    async fn event_skips_other_users_and_tables() {
        let registry = ChangeFeedRegistry::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let _other_user = registry.subscribe("appointments", other).await;
        let _other_table = registry.subscribe("messages", user).await;

        let delivered = registry.publish(&appointment_event(user)).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn resubscribe_replaces_previous_channel() {
        let registry = ChangeFeedRegistry::new();
        let user = Uuid::new_v4();

        let mut first = registry.subscribe("appointments", user).await;
        let mut second = registry.subscribe("appointments", user).await;

        registry.publish(&appointment_event(user)).await;

        // The replaced channel is closed; only the new one sees events.
        assert!(first.recv().await.is_err());
        assert!(second.recv().await.is_ok());

        let subscriptions = registry.active_subscriptions().await;
        assert_eq!(subscriptions.len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_closes_the_channel() {
        let registry = ChangeFeedRegistry::new();
        let user = Uuid::new_v4();

        let mut receiver = registry.subscribe("appointments", user).await;
        registry.unsubscribe("appointments", user).await;

        let delivered = registry.publish(&appointment_event(user)).await;
        assert_eq!(delivered, 0);
        assert!(receiver.recv().await.is_err());
    }
}
