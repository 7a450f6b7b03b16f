// libs/notification-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Appointment,
    Message,
    Payment,
    Review,
    System,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Appointment => write!(f, "appointment"),
            NotificationKind::Message => write!(f, "message"),
            NotificationKind::Payment => write!(f, "payment"),
            NotificationKind::Review => write!(f, "review"),
            NotificationKind::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub action_url: Option<String>,
}

/// Contact form payload. All four string fields are required; `user_id` is
/// attached when a signed-in user submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub user_id: Option<Uuid>,
}

fn email_regex() -> &'static regex::Regex {
    static EMAIL: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    EMAIL.get_or_init(|| {
        regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern")
    })
}

impl ContactRequest {
    /// Field-level validation; returns one message per offending field.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("name is required".to_string());
        }
        if self.email.trim().is_empty() {
            problems.push("email is required".to_string());
        } else if !email_regex().is_match(self.email.trim()) {
            problems.push("email is not valid".to_string());
        }
        if self.subject.trim().is_empty() {
            problems.push("subject is required".to_string());
        }
        if self.message.trim().is_empty() {
            problems.push("message is required".to_string());
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ContactRequest {
        ContactRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            subject: "Billing".to_string(),
            message: "Question about my invoice".to_string(),
            user_id: None,
        }
    }

    #[test]
    fn valid_contact_request_passes() {
        assert!(valid_request().validate().is_empty());
    }

    #[test]
    fn each_missing_field_is_reported() {
        let request = ContactRequest {
            name: " ".to_string(),
            email: String::new(),
            subject: String::new(),
            message: String::new(),
            user_id: None,
        };
        assert_eq!(request.validate().len(), 4);
    }

    #[test]
    fn email_without_at_sign_rejected() {
        let request = ContactRequest {
            email: "not-an-email".to_string(),
            ..valid_request()
        };
        assert_eq!(request.validate(), vec!["email is not valid".to_string()]);
    }
}
