use anyhow::Result;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::ContactRequest;

/// Contact form intake. Validation happens before any remote call; the
/// write itself goes through a server-side procedure.
pub struct ContactService {
    supabase: SupabaseClient,
}

impl ContactService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn submit(&self, request: &ContactRequest, auth_token: &str) -> Result<()> {
        debug!("Submitting contact message from {}", request.email);

        let _: Value = self
            .supabase
            .rpc(
                "submit_contact_message",
                auth_token,
                json!({
                    "p_name": request.name.trim(),
                    "p_email": request.email.trim(),
                    "p_subject": request.subject.trim(),
                    "p_message": request.message.trim(),
                    "p_user_id": request.user_id,
                }),
            )
            .await?;

        Ok(())
    }
}
