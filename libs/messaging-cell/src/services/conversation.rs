use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::{Profile, UNKNOWN_CLIENT};

use crate::models::{Conversation, Message, MessagingError, SendMessageRequest};

/// Inbox aggregator: folds the flat message table into one entry per
/// conversation partner, then batch-joins partner profiles.
pub struct ConversationService {
    supabase: SupabaseClient,
}

impl ConversationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn fetch_conversations(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Conversation>> {
        // Primary query: every message touching the user, newest first.
        let path = format!(
            "/rest/v1/messages?or=(sender_id.eq.{},receiver_id.eq.{})&order=created_at.desc",
            user_id, user_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let messages: Vec<Message> = rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
            .collect::<Result<_>>()?;

        let mut conversations = group_conversations(&messages, user_id);
        if conversations.is_empty() {
            return Ok(conversations);
        }

        // Secondary: one batched profile lookup for all partners. A miss or
        // failure degrades names to the placeholder, never the whole inbox.
        let partner_ids: Vec<Uuid> = conversations.iter().map(|c| c.partner_id).collect();
        let profiles = match self.fetch_profiles(&partner_ids, auth_token).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!("Partner profile lookup failed, degrading to placeholders: {}", e);
                HashMap::new()
            }
        };

        for conversation in &mut conversations {
            if let Some(profile) = profiles.get(&conversation.partner_id) {
                conversation.partner_name = profile.display_name();
                conversation.partner_image_url = profile.image_url();
            }
        }

        Ok(conversations)
    }

    pub async fn send_message(
        &self,
        sender_id: Uuid,
        request: SendMessageRequest,
        auth_token: &str,
    ) -> Result<Message, MessagingError> {
        if request.content.trim().is_empty() {
            return Err(MessagingError::ValidationError(
                "content must not be empty".to_string(),
            ));
        }

        debug!("Sending message from {} to {}", sender_id, request.receiver_id);

        let message_data = json!({
            "sender_id": sender_id,
            "receiver_id": request.receiver_id,
            "content": request.content,
            "is_read": false,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/messages",
                Some(auth_token),
                Some(message_data),
            )
            .await
            .map_err(|e| MessagingError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| MessagingError::DatabaseError("Insert returned no row".to_string()))?;
        serde_json::from_value(row).map_err(|e| MessagingError::DatabaseError(e.to_string()))
    }

    /// Mark everything the partner sent to the user as read.
    pub async fn mark_conversation_read(
        &self,
        user_id: Uuid,
        partner_id: Uuid,
        auth_token: &str,
    ) -> Result<(), MessagingError> {
        let path = format!(
            "/rest/v1/messages?receiver_id=eq.{}&sender_id=eq.{}&is_read=eq.false",
            user_id, partner_id
        );

        let _: Vec<Value> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": true })),
            )
            .await
            .map_err(|e| MessagingError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    pub async fn unread_total(&self, user_id: Uuid, auth_token: &str) -> Result<usize> {
        let path = format!(
            "/rest/v1/messages?receiver_id=eq.{}&is_read=eq.false&select=id",
            user_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows.len())
    }

    async fn fetch_profiles(
        &self,
        partner_ids: &[Uuid],
        auth_token: &str,
    ) -> Result<HashMap<Uuid, Profile>> {
        let path = format!(
            "/rest/v1/profiles?id={}",
            SupabaseClient::in_filter(partner_ids)
        );
        let rows: Vec<Profile> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Fold messages (newest first) into per-partner conversations. Entry order
/// follows the primary query: a partner appears at the position of their
/// newest message, so the inbox is ordered by last activity.
fn group_conversations(messages: &[Message], user_id: Uuid) -> Vec<Conversation> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut by_partner: HashMap<Uuid, Conversation> = HashMap::new();

    for message in messages {
        let partner_id = message.partner_of(user_id);

        let entry = by_partner.entry(partner_id).or_insert_with(|| {
            order.push(partner_id);
            Conversation {
                partner_id,
                partner_name: UNKNOWN_CLIENT.to_string(),
                partner_image_url: String::new(),
                // Newest-first input: the first message seen per partner is
                // the conversation's latest.
                last_message: message.content.clone(),
                last_message_at: message.created_at,
                unread_count: 0,
            }
        });

        if message.receiver_id == user_id && !message.is_read {
            entry.unread_count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|partner_id| by_partner.remove(&partner_id))
        .collect()
}
