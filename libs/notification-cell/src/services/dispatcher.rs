use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Notification, NotificationKind};

/// Writes notification records and exposes read/unread state. Persistence
/// failures are absorbed: callers get a boolean and must not assume the
/// record was written.
pub struct NotificationDispatcher {
    supabase: SupabaseClient,
}

impl NotificationDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
        action_url: Option<&str>,
        auth_token: &str,
    ) -> bool {
        let notification_data = json!({
            "user_id": user_id,
            "title": title,
            "message": message,
            "type": kind,
            "is_read": false,
            "action_url": action_url,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Result<Vec<Value>> = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/notifications",
                Some(auth_token),
                Some(notification_data),
            )
            .await;

        match result {
            Ok(_) => {
                debug!("Notification created for user {}", user_id);
                true
            }
            Err(e) => {
                error!("Failed to create notification for user {}: {}", user_id, e);
                false
            }
        }
    }

    /// Scoped to the owner: someone else's notification is a no-op.
    pub async fn mark_as_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
        auth_token: &str,
    ) -> bool {
        let path = format!(
            "/rest/v1/notifications?id=eq.{}&user_id=eq.{}",
            notification_id, user_id
        );
        let result: Result<Vec<Value>> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": true })),
            )
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to mark notification {} read: {}", notification_id, e);
                false
            }
        }
    }

    pub async fn mark_all_as_read(&self, user_id: Uuid, auth_token: &str) -> bool {
        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&is_read=eq.false",
            user_id
        );
        let result: Result<Vec<Value>> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": true })),
            )
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to mark notifications read for user {}: {}", user_id, e);
                false
            }
        }
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Notification>> {
        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&order=created_at.desc",
            user_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect()
    }

    pub async fn unread_count(&self, user_id: Uuid, auth_token: &str) -> Result<usize> {
        let path = format!(
            "/rest/v1/notifications?user_id=eq.{}&is_read=eq.false&select=id",
            user_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows.len())
    }
}
