use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder name used when a profile join misses. Referential integrity
/// is not enforced by the remote store, so aggregations must degrade
/// instead of failing.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => UNKNOWN_CLIENT.to_string(),
        }
    }

    pub fn image_url(&self) -> String {
        self.profile_image_url.clone().unwrap_or_default()
    }
}
