// libs/change-feed-cell/src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Row-change event as fanned out to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub event: ChangeEventKind,
    pub row: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEventKind::Insert => write!(f, "INSERT"),
            ChangeEventKind::Update => write!(f, "UPDATE"),
            ChangeEventKind::Delete => write!(f, "DELETE"),
        }
    }
}

// Columns that scope a row to a user across the tables we fan out.
const SCOPE_COLUMNS: &[&str] = &[
    "user_id",
    "client_id",
    "therapist_id",
    "sender_id",
    "receiver_id",
];

impl ChangeEvent {
    /// Whether this row concerns the given user, i.e. any of the row's
    /// scope columns carries their id.
    pub fn concerns(&self, user_id: Uuid) -> bool {
        let id = user_id.to_string();
        SCOPE_COLUMNS
            .iter()
            .any(|column| self.row[column].as_str() == Some(id.as_str()))
    }

    /// Uuid value of a row column, when present and well-formed.
    pub fn row_uuid(&self, column: &str) -> Option<Uuid> {
        self.row[column].as_str().and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// Database webhook delivery payload (one row change per request).
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeWebhookPayload {
    #[serde(rename = "type")]
    pub event: ChangeEventKind,
    pub table: String,
    pub record: Option<Value>,
    pub old_record: Option<Value>,
}

impl ChangeWebhookPayload {
    pub fn into_event(self) -> ChangeEvent {
        // Deletes only carry the old row.
        let row = match self.event {
            ChangeEventKind::Delete => self.old_record.unwrap_or(Value::Null),
            _ => self.record.unwrap_or(Value::Null),
        };
        ChangeEvent {
            table: self.table,
            event: self.event,
            row,
        }
    }
}

/// Subscription identity: exactly one live channel per (table, user) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub table: String,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_concerns_row_participants_only() {
        let therapist = Uuid::new_v4();
        let client = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let event = ChangeEvent {
            table: "appointments".to_string(),
            event: ChangeEventKind::Insert,
            row: json!({
                "id": Uuid::new_v4().to_string(),
                "client_id": client.to_string(),
                "therapist_id": therapist.to_string()
            }),
        };

        assert!(event.concerns(therapist));
        assert!(event.concerns(client));
        assert!(!event.concerns(stranger));
    }

    #[test]
    fn delete_events_use_the_old_row() {
        let user = Uuid::new_v4();
        let payload = ChangeWebhookPayload {
            event: ChangeEventKind::Delete,
            table: "notifications".to_string(),
            record: None,
            old_record: Some(json!({ "user_id": user.to_string() })),
        };

        let event = payload.into_event();
        assert!(event.concerns(user));
    }
}
